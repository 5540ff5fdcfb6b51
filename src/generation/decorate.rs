//! Decorator (C7): ore veins and surface vegetation, both placed against an
//! already-shaped and already-carved chunk.

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::biome::VegetationProfile;
use crate::block::BlockId;
use crate::chunk::{Chunk, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};

struct OreVein {
    block: BlockId,
    y_min: i32,
    y_max: i32,
    attempts_per_chunk: u32,
    max_radius: f32,
}

const ORE_VEINS: [OreVein; 4] = [
    OreVein { block: BlockId::COAL_ORE, y_min: 5, y_max: 120, attempts_per_chunk: 6, max_radius: 3.0 },
    OreVein { block: BlockId::IRON_ORE, y_min: 5, y_max: 64, attempts_per_chunk: 4, max_radius: 2.5 },
    OreVein { block: BlockId::GOLD_ORE, y_min: 5, y_max: 32, attempts_per_chunk: 2, max_radius: 2.0 },
    OreVein { block: BlockId::DIAMOND_ORE, y_min: 5, y_max: 16, attempts_per_chunk: 1, max_radius: 1.5 },
];

fn chunk_seed(world_seed: u64, cx: i32, cz: i32, stream: u64) -> u64 {
    world_seed
        ^ stream.wrapping_mul(0xA24BAED4963EE407)
        ^ (cx as i64 as u64).wrapping_mul(0x9E3779B97F4A7C15)
        ^ (cz as i64 as u64).wrapping_mul(0xC2B2AE3D27D4EB4F)
}

pub struct Decorator;

impl Decorator {
    pub fn new() -> Self {
        Decorator
    }

    pub fn decorate_chunk(&self, chunk: &mut Chunk, world_seed: u64) {
        self.place_ore_veins(chunk, world_seed);
        self.place_vegetation(chunk, world_seed);
    }

    fn place_ore_veins(&self, chunk: &mut Chunk, world_seed: u64) {
        let mut rng = StdRng::seed_from_u64(chunk_seed(world_seed, chunk.pos.x, chunk.pos.z, 1));
        for vein in ORE_VEINS.iter() {
            for _ in 0..vein.attempts_per_chunk {
                let cx = rng.gen_range(0..CHUNK_SIZE_X);
                let cy = rng.gen_range(vein.y_min..=vein.y_max.min(CHUNK_SIZE_Y - 1));
                let cz = rng.gen_range(0..CHUNK_SIZE_Z);
                let radius = rng.gen_range(vein.max_radius * 0.5..=vein.max_radius);
                self.stamp_vein(chunk, cx, cy, cz, radius, vein.block);
            }
        }
    }

    fn stamp_vein(&self, chunk: &mut Chunk, cx: i32, cy: i32, cz: i32, radius: f32, ore: BlockId) {
        let r = radius.ceil() as i32;
        for dy in -r..=r {
            let ly = cy + dy;
            if !(1..CHUNK_SIZE_Y - 1).contains(&ly) {
                continue;
            }
            for dz in -r..=r {
                let lz = cz + dz;
                if !(0..CHUNK_SIZE_Z).contains(&lz) {
                    continue;
                }
                for dx in -r..=r {
                    let lx = cx + dx;
                    if !(0..CHUNK_SIZE_X).contains(&lx) {
                        continue;
                    }
                    let dist_sq = (dx * dx) as f32 / (radius * radius)
                        + (dy * dy) as f32 / (radius * radius)
                        + (dz * dz) as f32 / (radius * radius);
                    if dist_sq > 1.0 {
                        continue;
                    }
                    if chunk.block_local(lx, ly, lz) == BlockId::STONE {
                        chunk.set_block_local(lx, ly, lz, ore);
                    }
                }
            }
        }
    }

    fn place_vegetation(&self, chunk: &mut Chunk, world_seed: u64) {
        let mut rng = StdRng::seed_from_u64(chunk_seed(world_seed, chunk.pos.x, chunk.pos.z, 2));
        for lz in 0..CHUNK_SIZE_Z {
            for lx in 0..CHUNK_SIZE_X {
                let surface = chunk.surface_height(lx, lz);
                if surface < 0 || surface >= CHUNK_SIZE_Y as i16 - 8 {
                    continue;
                }
                let ground = chunk.block_local(lx, surface as i32, lz);
                if ground != BlockId::GRASS && ground != BlockId::DIRT {
                    continue;
                }
                let above = surface as i32 + 1;
                if chunk.block_local(lx, above, lz) != BlockId::AIR {
                    continue;
                }

                let biome = chunk.biome_local(lx, lz).def();
                let veg = &biome.vegetation;

                let tree_roll: f32 = rng.gen();
                let mut placed_tree = false;
                if let Some(tree) = pick_tree(veg, tree_roll) {
                    placed_tree = self.stamp_tree(chunk, lx, above, lz, tree, &mut rng);
                }

                if !placed_tree && !veg.simple_decorations.is_empty() {
                    let decoration_roll: f32 = rng.gen();
                    if decoration_roll < 0.08 * veg.veg_multiplier.max(0.0) {
                        let choice = rng.gen_range(0..veg.simple_decorations.len());
                        if chunk.block_local(lx, above, lz) == BlockId::AIR {
                            chunk.set_block_local(lx, above, lz, veg.simple_decorations[choice]);
                        }
                    }
                }
            }
        }
    }

    /// Stamps a trunk-plus-canopy schematic. Never overwrites a non-air
    /// cell; aborts (leaving any already-placed trunk blocks) if the
    /// canopy would run past the chunk's Y ceiling.
    fn stamp_tree(
        &self,
        chunk: &mut Chunk,
        lx: i32,
        base_y: i32,
        lz: i32,
        kind: &'static str,
        rng: &mut StdRng,
    ) -> bool {
        let trunk_height = if kind == "jungle_tree" {
            rng.gen_range(6..=9)
        } else {
            rng.gen_range(4..=6)
        };
        let top = base_y + trunk_height;
        if top + 2 >= CHUNK_SIZE_Y {
            return false;
        }

        let trunk_block = if kind == "cactus" { BlockId::CACTUS } else { BlockId::LOG };
        for y in base_y..top {
            if chunk.block_local(lx, y, lz) != BlockId::AIR {
                return false;
            }
        }
        for y in base_y..top {
            chunk.set_block_local(lx, y, lz, trunk_block);
        }

        if kind == "cactus" {
            return true;
        }

        for dy in -1..=1i32 {
            for dz in -2..=2i32 {
                for dx in -2..=2i32 {
                    if dx.abs() == 2 && dz.abs() == 2 {
                        continue;
                    }
                    let tx = lx + dx;
                    let ty = top + dy;
                    let tz = lz + dz;
                    if !(0..CHUNK_SIZE_X).contains(&tx) || !(0..CHUNK_SIZE_Z).contains(&tz) {
                        continue;
                    }
                    if !(0..CHUNK_SIZE_Y).contains(&ty) {
                        continue;
                    }
                    if chunk.block_local(tx, ty, tz) == BlockId::AIR {
                        chunk.set_block_local(tx, ty, tz, BlockId::LEAVES);
                    }
                }
            }
        }
        true
    }
}

impl Default for Decorator {
    fn default() -> Self {
        Self::new()
    }
}

fn pick_tree(veg: &VegetationProfile, roll: f32) -> Option<&'static str> {
    let mut acc = 0.0;
    for tree in veg.trees {
        acc += tree.weight * veg.veg_multiplier.max(0.0);
        if roll < acc {
            return Some(tree.kind);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeSource;
    use crate::chunk::ChunkPos;
    use crate::config::WorldConfig;
    use crate::generation::terrain::TerrainShaper;
    use crate::noise::{NoiseStack, Reduction};

    fn shaped_chunk(seed: u64, pos: ChunkPos) -> Chunk {
        let noise = NoiseStack::new(seed);
        let biomes = BiomeSource::new();
        let config = WorldConfig::default();
        let shaper = TerrainShaper::new(&noise, &biomes, &config);
        let mut chunk = Chunk::new(pos);
        shaper.shape_chunk(&mut chunk, Reduction::Full);
        chunk
    }

    #[test]
    fn ore_veins_only_ever_replace_stone() {
        let mut chunk = shaped_chunk(99, ChunkPos::new(0, 0));
        let before: Vec<BlockId> = chunk.blocks().to_vec();
        Decorator::new().place_ore_veins(&mut chunk, 99);
        for (idx, (&b, &a)) in before.iter().zip(chunk.blocks().iter()).enumerate() {
            if b != a {
                assert_eq!(b, BlockId::STONE, "ore replaced non-stone at index {idx}");
            }
        }
    }

    #[test]
    fn decoration_is_deterministic_for_a_fixed_seed() {
        let mut a = shaped_chunk(7, ChunkPos::new(1, 1));
        let mut b = shaped_chunk(7, ChunkPos::new(1, 1));
        let decorator = Decorator::new();
        decorator.decorate_chunk(&mut a, 7);
        decorator.decorate_chunk(&mut b, 7);
        assert_eq!(a.blocks(), b.blocks());
    }
}
