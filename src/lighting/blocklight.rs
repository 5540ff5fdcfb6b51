//! RGB block-light pass (C8): a three-channel BFS flood fill seeded from
//! every emitter cell in the chunk.

use std::collections::VecDeque;

use crate::block::{is_opaque, BLOCK_CATALOG};
use crate::chunk::{Chunk, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};

const NEIGHBORS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

pub struct BlockLightPass;

impl BlockLightPass {
    /// Re-seeds and floods block light for the whole chunk. Cross-chunk
    /// propagation across chunk boundaries is the caller's responsibility.
    pub fn run(chunk: &mut Chunk) {
        let mut queue: VecDeque<(i32, i32, i32)> = VecDeque::new();

        for lz in 0..CHUNK_SIZE_Z {
            for lx in 0..CHUNK_SIZE_X {
                for ly in 0..CHUNK_SIZE_Y {
                    let existing = chunk.light_local(lx, ly, lz);
                    chunk.set_light_local(lx, ly, lz, existing.with_rgb(0, 0, 0));

                    let block = chunk.block_local(lx, ly, lz);
                    let (r, g, b) = BLOCK_CATALOG.get(block).emission;
                    if r > 0 || g > 0 || b > 0 {
                        chunk.set_light_local(lx, ly, lz, chunk.light_local(lx, ly, lz).with_rgb(r, g, b));
                        queue.push_back((lx, ly, lz));
                    }
                }
            }
        }

        while let Some((lx, ly, lz)) = queue.pop_front() {
            let current = chunk.light_local(lx, ly, lz);
            for (dx, dy, dz) in NEIGHBORS {
                let (nx, ny, nz) = (lx + dx, ly + dy, lz + dz);
                if !(0..CHUNK_SIZE_X).contains(&nx)
                    || !(0..CHUNK_SIZE_Y).contains(&ny)
                    || !(0..CHUNK_SIZE_Z).contains(&nz)
                {
                    continue;
                }
                let neighbor_block = chunk.block_local(nx, ny, nz);
                if is_opaque(neighbor_block) {
                    continue;
                }

                let neighbor = chunk.light_local(nx, ny, nz);
                let prop_r = current.r().saturating_sub(1);
                let prop_g = current.g().saturating_sub(1);
                let prop_b = current.b().saturating_sub(1);
                let new_r = neighbor.r().max(prop_r);
                let new_g = neighbor.g().max(prop_g);
                let new_b = neighbor.b().max(prop_b);

                if new_r != neighbor.r() || new_g != neighbor.g() || new_b != neighbor.b() {
                    chunk.set_light_local(nx, ny, nz, neighbor.with_rgb(new_r, new_g, new_b));
                    queue.push_back((nx, ny, nz));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockId;
    use crate::chunk::ChunkPos;

    #[test]
    fn glowstone_lights_its_own_cell_at_full_strength() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block_local(8, 8, 8, BlockId::GLOWSTONE);
        BlockLightPass::run(&mut chunk);
        let light = chunk.light_local(8, 8, 8);
        assert_eq!((light.r(), light.g(), light.b()), (15, 15, 15));
    }

    #[test]
    fn light_falls_off_by_one_per_block_through_air() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block_local(8, 8, 8, BlockId::GLOWSTONE);
        BlockLightPass::run(&mut chunk);
        let one_away = chunk.light_local(9, 8, 8);
        assert_eq!(one_away.r(), 14);
        let two_away = chunk.light_local(10, 8, 8);
        assert_eq!(two_away.r(), 13);
    }

    #[test]
    fn opaque_blocks_never_receive_propagated_light() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block_local(8, 8, 8, BlockId::GLOWSTONE);
        chunk.set_block_local(9, 8, 8, BlockId::STONE);
        BlockLightPass::run(&mut chunk);
        let light = chunk.light_local(9, 8, 8);
        assert_eq!((light.r(), light.g(), light.b()), (0, 0, 0));
    }
}
