//! Generator Registry (C18 / ambient): capability-set dispatch over worldgen
//! strategies, bound once at construction so callers never match on the
//! concrete generator afterward.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::block::BlockId;
use crate::chunk::{Chunk, ChunkPos, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::config::{GeneratorKind, WorldConfig};
use crate::biome::{BiomeId, BiomeSource};
use crate::error::{WorldError, WorldResult};
use crate::noise::{NoiseStack, Reduction};

use super::caves::CaveSystem;
use super::decorate::Decorator;
use super::terrain::{ColumnShape, TerrainShaper};

#[derive(Debug, Clone, Copy)]
pub struct GeneratorInfo {
    pub name: &'static str,
    pub min_y: i32,
    pub max_y: i32,
}

/// Shared capability set for worldgen strategies. No RTTI: a `WorldGenerator`
/// is bound once at world construction and used through this trait only.
pub trait WorldGenerator: Send + Sync {
    /// Runs the full pipeline for `pos`, checking `stop` between phases so
    /// a worker can abort early on cancellation. Returns
    /// `WorldError::GeneratorAbort` if `stop` trips before the pipeline
    /// finishes; the caller is responsible for retrying or discarding the
    /// chunk's `generating` state.
    fn generate_chunk(&self, pos: ChunkPos, stop: &AtomicBool) -> WorldResult<Chunk>;
    fn info(&self) -> GeneratorInfo;
    fn column_query(&self, world_x: i32, world_z: i32) -> ColumnShape;
}

pub fn create(config: &WorldConfig) -> Box<dyn WorldGenerator> {
    match config.generator {
        GeneratorKind::Overworld => Box::new(Overworld::new(config.clone())),
        GeneratorKind::Flat => Box::new(Flat::new(config.clone())),
    }
}

/// Full C3-C7 pipeline: noise, biome, terrain, caves, decoration.
pub struct Overworld {
    noise: NoiseStack,
    biomes: BiomeSource,
    config: WorldConfig,
}

impl Overworld {
    pub fn new(config: WorldConfig) -> Self {
        Overworld {
            noise: NoiseStack::new(config.seed),
            biomes: BiomeSource::new(),
            config,
        }
    }
}

impl WorldGenerator for Overworld {
    fn generate_chunk(&self, pos: ChunkPos, stop: &AtomicBool) -> WorldResult<Chunk> {
        let abort = || WorldError::GeneratorAbort { cx: pos.x, cz: pos.z };

        let shaper = TerrainShaper::new(&self.noise, &self.biomes, &self.config);
        let mut chunk = Chunk::new(pos);
        shaper.shape_chunk(&mut chunk, Reduction::Full);
        if stop.load(Ordering::Relaxed) {
            return Err(abort());
        }

        let caves = CaveSystem::new(&self.noise);
        caves.carve_chunk(&mut chunk, self.config.seed, self.config.sea_level);
        if stop.load(Ordering::Relaxed) {
            return Err(abort());
        }

        Decorator::new().decorate_chunk(&mut chunk, self.config.seed);
        if stop.load(Ordering::Relaxed) {
            return Err(abort());
        }

        chunk.flags.generated = true;
        Ok(chunk)
    }

    fn info(&self) -> GeneratorInfo {
        GeneratorInfo {
            name: "overworld",
            min_y: 0,
            max_y: 255,
        }
    }

    fn column_query(&self, world_x: i32, world_z: i32) -> ColumnShape {
        let shaper = TerrainShaper::new(&self.noise, &self.biomes, &self.config);
        shaper.shape_column(world_x, world_z, Reduction::Full)
    }
}

/// Trivial fixed-height single-biome generator for tests and debugging.
pub struct Flat {
    config: WorldConfig,
    height: i32,
}

impl Flat {
    pub fn new(config: WorldConfig) -> Self {
        let height = config.sea_level;
        Flat { config, height }
    }
}

impl WorldGenerator for Flat {
    fn generate_chunk(&self, pos: ChunkPos, stop: &AtomicBool) -> WorldResult<Chunk> {
        if stop.load(Ordering::Relaxed) {
            return Err(WorldError::GeneratorAbort { cx: pos.x, cz: pos.z });
        }
        let mut chunk = Chunk::new(pos);
        for lz in 0..CHUNK_SIZE_Z {
            for lx in 0..CHUNK_SIZE_X {
                chunk.set_block_local(lx, 0, lz, BlockId::BEDROCK);
                for y in 1..self.height {
                    chunk.set_block_local(lx, y, lz, BlockId::STONE);
                }
                chunk.set_block_local(lx, self.height, lz, BlockId::GRASS);
                chunk.set_biome_local(lx, lz, BiomeId::PLAINS);
            }
        }
        chunk.recompute_height_map();
        chunk.flags.generated = true;
        Ok(chunk)
    }

    fn info(&self) -> GeneratorInfo {
        GeneratorInfo {
            name: "flat",
            min_y: 0,
            max_y: self.height,
        }
    }

    fn column_query(&self, _world_x: i32, _world_z: i32) -> ColumnShape {
        ColumnShape {
            height: self.height,
            continentalness: 0.5,
            erosion: 0.5,
            ridge: 0.0,
            slope: 0.0,
            is_underwater: false,
            is_ocean: false,
            selection: crate::biome::BiomeSelection {
                biome: BiomeId::PLAINS,
                primary: BiomeId::PLAINS,
                secondary: None,
                band: None,
            },
        }
    }
}
