//! Terrain Shaper (C5): composes the noise stack into a height field and
//! fills block columns, with coastal surface rules and biome-edge
//! blending.

use crate::biome::{BiomeQuery, BiomeSelection, BiomeSource};
use crate::block::BlockId;
use crate::chunk::{Chunk, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::config::WorldConfig;
use crate::noise::{NoiseStack, Reduction};

const FILLER_DEPTH: i32 = 4;

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Piecewise-linear height control points keyed by continentalness,
/// continuous (Lipschitz) by construction since each segment is a plain
/// linear interpolation between adjacent control points.
fn continental_base_height(c: f32) -> f32 {
    const POINTS: [(f32, f32); 4] = [(0.0, 30.0), (0.35, 50.0), (0.6, 68.0), (1.0, 100.0)];
    if c <= POINTS[0].0 {
        return POINTS[0].1;
    }
    for window in POINTS.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        if c <= x1 {
            let t = smoothstep(x0, x1, c);
            return lerp(y0, y1, t);
        }
    }
    POINTS[POINTS.len() - 1].1
}

pub struct ColumnShape {
    pub height: i32,
    pub continentalness: f32,
    pub erosion: f32,
    pub ridge: f32,
    pub slope: f32,
    pub is_underwater: bool,
    pub is_ocean: bool,
    pub selection: BiomeSelection,
}

pub struct TerrainShaper<'a> {
    noise: &'a NoiseStack,
    biomes: &'a BiomeSource,
    config: &'a WorldConfig,
}

impl<'a> TerrainShaper<'a> {
    pub fn new(noise: &'a NoiseStack, biomes: &'a BiomeSource, config: &'a WorldConfig) -> Self {
        TerrainShaper {
            noise,
            biomes,
            config,
        }
    }

    fn height_at(&self, world_x: i32, world_z: i32, reduction: Reduction) -> (f32, f32, f32, f32) {
        let x = world_x as f64;
        let z = world_z as f64;
        let c = self.noise.continentalness(x, z, reduction);
        let jitter = self.noise.coast_jitter(x, z);
        let c_prime = (c + jitter).clamp(0.0, 1.0);
        let erosion = self.noise.erosion(x, z, reduction);
        let ridge = self.noise.ridge(
            x,
            z,
            c_prime,
            self.config.ridge_inland_min,
            self.config.ridge_inland_max,
            self.config.ridge_inland_sparsity,
            reduction,
        );

        let base = continental_base_height(c_prime);
        let roughness = (1.0 - erosion) * 40.0;
        let height = base + ridge * roughness;
        (height, c_prime, erosion, ridge)
    }

    /// Full shape for one world column, including biome edge detection.
    pub fn shape_column(&self, world_x: i32, world_z: i32, reduction: Reduction) -> ColumnShape {
        let (height, c_prime, erosion, ridge) = self.height_at(world_x, world_z, reduction);

        let (h_east, ..) = self.height_at(world_x + 1, world_z, reduction);
        let (h_west, ..) = self.height_at(world_x - 1, world_z, reduction);
        let (h_north, ..) = self.height_at(world_x, world_z + 1, reduction);
        let (h_south, ..) = self.height_at(world_x, world_z - 1, reduction);
        let slope = ((h_east - h_west).abs().max((h_north - h_south).abs()) / 8.0).clamp(0.0, 1.0);

        let sea_level = self.config.sea_level as f32;
        let is_underwater = height < sea_level;
        let is_ocean = c_prime < self.config.ocean_threshold;

        let x = world_x as f64;
        let z = world_z as f64;
        let temperature = self
            .noise
            .temperature(x, z, height, self.config.temp_lapse, reduction);
        let humidity = self
            .noise
            .humidity(x, z, height, self.config.temp_lapse, reduction);
        let river_mask = self.noise.river_mask(x, z, reduction);

        let center_query = BiomeQuery {
            heat: temperature,
            humidity,
            height,
            continentalness: c_prime,
            slope,
        };

        let selection = self.biomes.resolve(
            world_x,
            world_z,
            center_query,
            river_mask,
            |sx, sz| {
                let (h, c, _, _) = self.height_at(sx, sz, reduction);
                let x = sx as f64;
                let z = sz as f64;
                let heat = self
                    .noise
                    .temperature(x, z, h, self.config.temp_lapse, reduction);
                let hum = self
                    .noise
                    .humidity(x, z, h, self.config.temp_lapse, reduction);
                let river = self.noise.river_mask(x, z, reduction);
                (
                    BiomeQuery {
                        heat,
                        humidity: hum,
                        height: h,
                        continentalness: c,
                        slope,
                    },
                    river,
                )
            },
        );

        ColumnShape {
            height: height.round() as i32,
            continentalness: c_prime,
            erosion,
            ridge,
            slope,
            is_underwater,
            is_ocean,
            selection,
        }
    }

    /// Fills every column of `chunk` from bedrock up, writing the biome
    /// array as it goes. Does not touch lighting or decoration.
    pub fn shape_chunk(&self, chunk: &mut Chunk, reduction: Reduction) {
        let (origin_x, origin_z) = chunk.pos.world_origin();
        for lz in 0..CHUNK_SIZE_Z {
            for lx in 0..CHUNK_SIZE_X {
                let world_x = origin_x + lx;
                let world_z = origin_z + lz;
                let shape = self.shape_column(world_x, world_z, reduction);
                self.fill_column(chunk, lx, lz, world_x, world_z, &shape);
                chunk.set_biome_local(lx, lz, shape.selection.biome);
            }
        }
        chunk.recompute_height_map();
    }

    fn fill_column(
        &self,
        chunk: &mut Chunk,
        lx: i32,
        lz: i32,
        world_x: i32,
        world_z: i32,
        shape: &ColumnShape,
    ) {
        let sea_level = self.config.sea_level;
        let height = shape.height.max(1);

        let primary_def = shape.selection.primary.def();
        let (surface_block, filler_block) = if let Some(secondary) = shape.selection.secondary {
            let secondary_def = secondary.def();
            let dither = self.noise.detail(world_x as f64, world_z as f64);
            if dither < shape.selection.blend_factor() {
                (secondary_def.surface_block, secondary_def.filler_block)
            } else {
                (primary_def.surface_block, primary_def.filler_block)
            }
        } else {
            (primary_def.surface_block, primary_def.filler_block)
        };

        let (surface_block, filler_block) =
            self.apply_coastal_rules(shape, surface_block, filler_block);

        chunk.set_block_local(lx, 0, lz, BlockId::BEDROCK);
        let filler_start = (height - FILLER_DEPTH).max(1);
        for y in 1..filler_start {
            chunk.set_block_local(lx, y, lz, BlockId::STONE);
        }
        for y in filler_start..height {
            chunk.set_block_local(lx, y, lz, filler_block);
        }
        chunk.set_block_local(lx, height, lz, surface_block);

        if shape.is_underwater {
            for y in (height + 1)..=sea_level {
                chunk.set_block_local(lx, y, lz, BlockId::WATER);
            }
        }
    }

    fn apply_coastal_rules(
        &self,
        shape: &ColumnShape,
        surface: BlockId,
        filler: BlockId,
    ) -> (BlockId, BlockId) {
        let near_coast =
            (shape.continentalness - self.config.ocean_threshold).abs() < 0.06;
        if !near_coast {
            return (surface, filler);
        }
        if shape.is_underwater {
            if shape.slope > 0.35 {
                (BlockId::GRAVEL, BlockId::GRAVEL)
            } else {
                (BlockId::SAND, BlockId::SAND)
            }
        } else if shape.slope > 0.6 {
            (BlockId::STONE, BlockId::STONE)
        } else {
            (BlockId::SAND, BlockId::SAND)
        }
    }
}
