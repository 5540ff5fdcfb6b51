//! Cave System (C6): cavity noise plus wormy tunnel carving, both masked so
//! caves never break the surface, touch bedrock, or reach `y = 255`.

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::block::BlockId;
use crate::chunk::{Chunk, CHUNK_BLOCKS, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};
use crate::noise::{NoiseStack, Reduction};

const SURFACE_GUARD: i32 = 4;
const WORM_COUNT: u32 = 3;
const WORM_MAX_STEPS: u32 = 48;

/// Dense per-chunk carve mask, one bit per voxel.
struct CarveMask {
    bits: Vec<u64>,
}

impl CarveMask {
    fn new() -> Self {
        CarveMask {
            bits: vec![0u64; CHUNK_BLOCKS.div_ceil(64)],
        }
    }

    fn set(&mut self, index: usize) {
        self.bits[index / 64] |= 1u64 << (index % 64);
    }

    fn get(&self, index: usize) -> bool {
        (self.bits[index / 64] >> (index % 64)) & 1 == 1
    }
}

fn chunk_rng_seed(world_seed: u64, cx: i32, cz: i32) -> u64 {
    world_seed
        ^ ((cx as i64 as u64).wrapping_mul(0x9E3779B97F4A7C15))
        ^ ((cz as i64 as u64).wrapping_mul(0xC2B2AE3D27D4EB4F))
}

pub struct CaveSystem<'a> {
    noise: &'a NoiseStack,
}

impl<'a> CaveSystem<'a> {
    pub fn new(noise: &'a NoiseStack) -> Self {
        CaveSystem { noise }
    }

    pub fn carve_chunk(&self, chunk: &mut Chunk, world_seed: u64, sea_level: i32) {
        let mut mask = CarveMask::new();
        self.mark_cavity_noise(chunk, &mut mask);
        self.mark_worms(chunk, &mut mask, world_seed);
        self.apply_mask(chunk, &mask, sea_level);
    }

    fn mark_cavity_noise(&self, chunk: &Chunk, mask: &mut CarveMask) {
        let (origin_x, origin_z) = chunk.pos.world_origin();
        for lz in 0..CHUNK_SIZE_Z {
            for lx in 0..CHUNK_SIZE_X {
                let surface = chunk.surface_height(lx, lz);
                let world_x = (origin_x + lx) as f64;
                let world_z = (origin_z + lz) as f64;
                let carve_ceiling = (surface as i32 - SURFACE_GUARD).max(1);
                for ly in 1..carve_ceiling.min(CHUNK_SIZE_Y - 1) {
                    let density =
                        self.noise
                            .cave_density(world_x, ly as f64, world_z, Reduction::Full);
                    let depth_below_surface = (surface as i32 - ly).max(0) as f32;
                    let proximity = (SURFACE_GUARD as f32 - depth_below_surface.min(SURFACE_GUARD as f32))
                        / SURFACE_GUARD as f32;
                    let threshold = 0.6 + proximity * 0.35;
                    if density > threshold {
                        mask.set(crate::chunk::block_index(lx, ly, lz));
                    }
                }
            }
        }
    }

    fn mark_worms(&self, chunk: &Chunk, mask: &mut CarveMask, world_seed: u64) {
        let mut rng = StdRng::seed_from_u64(chunk_rng_seed(world_seed, chunk.pos.x, chunk.pos.z));
        for _ in 0..WORM_COUNT {
            let mut x = rng.gen_range(0.0..CHUNK_SIZE_X as f32);
            let mut y = rng.gen_range(12.0..100.0);
            let mut z = rng.gen_range(0.0..CHUNK_SIZE_Z as f32);
            let mut yaw = rng.gen_range(0.0..std::f32::consts::TAU);
            let mut pitch: f32 = rng.gen_range(-0.3..0.3);
            let steps = rng.gen_range(WORM_MAX_STEPS / 2..=WORM_MAX_STEPS);
            let radius = rng.gen_range(1.0..2.6);

            for _ in 0..steps {
                yaw += rng.gen_range(-0.35..0.35);
                pitch = (pitch + rng.gen_range(-0.15..0.15)).clamp(-0.6, 0.6);
                x += yaw.cos() * pitch.cos();
                z += yaw.sin() * pitch.cos();
                y += pitch.sin();

                self.stamp_sphere(chunk, mask, x, y, z, radius);

                if !(-8.0..(CHUNK_SIZE_X as f32 + 8.0)).contains(&x)
                    || !(-8.0..(CHUNK_SIZE_Z as f32 + 8.0)).contains(&z)
                    || !(8.0..200.0).contains(&y)
                {
                    break;
                }
            }
        }
    }

    fn stamp_sphere(
        &self,
        chunk: &Chunk,
        mask: &mut CarveMask,
        cx: f32,
        cy: f32,
        cz: f32,
        radius: f32,
    ) {
        let r = radius.ceil() as i32;
        for dy in -r..=r {
            let ly = cy.round() as i32 + dy;
            if !(1..CHUNK_SIZE_Y - 1).contains(&ly) {
                continue;
            }
            for dz in -r..=r {
                let lz = cz.round() as i32 + dz;
                if !(0..CHUNK_SIZE_Z).contains(&lz) {
                    continue;
                }
                for dx in -r..=r {
                    let lx = cx.round() as i32 + dx;
                    if !(0..CHUNK_SIZE_X).contains(&lx) {
                        continue;
                    }
                    let dist_sq = (dx * dx + dy * dy + dz * dz) as f32;
                    if dist_sq > radius * radius {
                        continue;
                    }
                    let surface = chunk.surface_height(lx, lz);
                    if ly as i16 > surface - SURFACE_GUARD as i16 {
                        continue;
                    }
                    mask.set(crate::chunk::block_index(lx, ly, lz));
                }
            }
        }
    }

    fn apply_mask(&self, chunk: &mut Chunk, mask: &CarveMask, sea_level: i32) {
        for lz in 0..CHUNK_SIZE_Z {
            for lx in 0..CHUNK_SIZE_X {
                for ly in 1..CHUNK_SIZE_Y - 1 {
                    let idx = crate::chunk::block_index(lx, ly, lz);
                    if !mask.get(idx) {
                        continue;
                    }
                    let current = chunk.block_local(lx, ly, lz);
                    if current == BlockId::BEDROCK || current == BlockId::AIR {
                        continue;
                    }
                    let replacement = if ly <= sea_level {
                        BlockId::WATER
                    } else {
                        BlockId::AIR
                    };
                    chunk.set_block_local(lx, ly, lz, replacement);
                }
            }
        }
        chunk.recompute_height_map();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkPos;
    use crate::config::WorldConfig;
    use crate::biome::BiomeSource;
    use crate::generation::terrain::TerrainShaper;

    fn generated_chunk(seed: u64) -> Chunk {
        let noise = NoiseStack::new(seed);
        let biomes = BiomeSource::new();
        let config = WorldConfig::default();
        let shaper = TerrainShaper::new(&noise, &biomes, &config);
        let mut chunk = Chunk::new(ChunkPos::new(3, -2));
        shaper.shape_chunk(&mut chunk, crate::noise::Reduction::Full);
        chunk
    }

    #[test]
    fn caves_never_touch_bedrock_or_y_255() {
        let noise = NoiseStack::new(0xCAFE);
        let mut chunk = generated_chunk(0xCAFE);
        let caves = CaveSystem::new(&noise);
        caves.carve_chunk(&mut chunk, 0xCAFE, 64);

        for lz in 0..CHUNK_SIZE_Z {
            for lx in 0..CHUNK_SIZE_X {
                assert_eq!(chunk.block_local(lx, 0, lz), BlockId::BEDROCK);
                assert_ne!(chunk.block_local(lx, 255, lz), BlockId::AIR);
            }
        }
    }

    #[test]
    fn carving_is_deterministic_for_a_fixed_seed() {
        let noise = NoiseStack::new(123);
        let mut a = generated_chunk(123);
        let mut b = generated_chunk(123);
        let caves = CaveSystem::new(&noise);
        caves.carve_chunk(&mut a, 123, 64);
        caves.carve_chunk(&mut b, 123, 64);
        assert_eq!(a.blocks(), b.blocks());
    }
}
