//! Heightmap sampling and quad meshing for the outer LOD tiers (C12):
//! one flat quad per coarse cell, sampled through the generator's
//! `column_query` capability rather than full chunk generation.

use cgmath::Vector3;

use crate::biome::BiomeId;
use crate::block::{BlockId, BLOCK_CATALOG};
use crate::chunk::CHUNK_SIZE_X;
use crate::generation::WorldGenerator;
use crate::mesh::LodVertex;

/// Cells sampled per region edge, independent of the region's native chunk
/// count. A flat quad grid at this resolution is cheap to build even for
/// an 8x8-chunk L3 region.
pub const LOD_CELLS_PER_SIDE: i32 = 8;

/// Coarse per-cell terrain data for one LOD region, sampled through
/// [`WorldGenerator::column_query`] at each cell's center.
pub struct LodSample {
    pub heights: Vec<f32>,
    pub biomes: Vec<BiomeId>,
    pub top_blocks: Vec<BlockId>,
}

/// Samples `region_size_chunks x region_size_chunks` chunks worth of
/// terrain at `LOD_CELLS_PER_SIDE x LOD_CELLS_PER_SIDE` resolution.
pub fn sample_region(
    generator: &dyn WorldGenerator,
    rx: i32,
    rz: i32,
    region_size_chunks: i32,
) -> LodSample {
    let cells = (LOD_CELLS_PER_SIDE * LOD_CELLS_PER_SIDE) as usize;
    let mut heights = Vec::with_capacity(cells);
    let mut biomes = Vec::with_capacity(cells);
    let mut top_blocks = Vec::with_capacity(cells);

    let region_size_blocks = (region_size_chunks * CHUNK_SIZE_X) as f32;
    let cell_size = region_size_blocks / LOD_CELLS_PER_SIDE as f32;
    let origin_x = (rx * region_size_chunks * CHUNK_SIZE_X) as f32;
    let origin_z = (rz * region_size_chunks * CHUNK_SIZE_X) as f32;

    for cz in 0..LOD_CELLS_PER_SIDE {
        for cx in 0..LOD_CELLS_PER_SIDE {
            let wx = (origin_x + (cx as f32 + 0.5) * cell_size) as i32;
            let wz = (origin_z + (cz as f32 + 0.5) * cell_size) as i32;
            let shape = generator.column_query(wx, wz);
            heights.push(shape.height as f32);
            biomes.push(shape.selection.biome);
            let top = if shape.is_underwater {
                BlockId::WATER
            } else {
                shape.selection.biome.def().surface_block
            };
            top_blocks.push(top);
        }
    }

    LodSample { heights, biomes, top_blocks }
}

fn cell_index(cx: i32, cz: i32) -> usize {
    (cz * LOD_CELLS_PER_SIDE + cx) as usize
}

/// Emits one top-facing quad per cell, colored by that cell's top block,
/// positioned in chunk-local (region-local) coordinates at the cell's
/// sampled height. Mirrors `mesher::push_quad`'s cross-product winding
/// check so the emitted triangles face up regardless of axis convention.
pub fn build_region_mesh(sample: &LodSample, region_size_chunks: i32) -> Vec<LodVertex> {
    let region_size_blocks = (region_size_chunks * CHUNK_SIZE_X) as f32;
    let cell_size = region_size_blocks / LOD_CELLS_PER_SIDE as f32;
    let normal = Vector3::new(0.0_f32, 1.0, 0.0);
    let mut out = Vec::with_capacity((LOD_CELLS_PER_SIDE * LOD_CELLS_PER_SIDE) as usize * 6);

    for cz in 0..LOD_CELLS_PER_SIDE {
        for cx in 0..LOD_CELLS_PER_SIDE {
            let index = cell_index(cx, cz);
            let height = sample.heights[index];
            let color = BLOCK_CATALOG.get(sample.top_blocks[index]).default_color;

            let x0 = cx as f32 * cell_size;
            let z0 = cz as f32 * cell_size;
            let p0 = [x0, height, z0];
            let p1 = [x0 + cell_size, height, z0];
            let p2 = [x0 + cell_size, height, z0 + cell_size];
            let p3 = [x0, height, z0 + cell_size];
            let positions = [p0, p1, p2, p3];
            let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

            let u = Vector3::new(cell_size, 0.0, 0.0);
            let v = Vector3::new(0.0, 0.0, cell_size);
            let cross = Vector3::new(
                u.y * v.z - u.z * v.y,
                u.z * v.x - u.x * v.z,
                u.x * v.y - u.y * v.x,
            );
            let facing_forward = cross.x * normal.x + cross.y * normal.y + cross.z * normal.z >= 0.0;
            let order: [usize; 6] = if facing_forward {
                [0, 1, 2, 0, 2, 3]
            } else {
                [0, 3, 2, 0, 2, 1]
            };

            for i in order {
                out.push(LodVertex {
                    position: positions[i],
                    color,
                    normal: [normal.x, normal.y, normal.z],
                    uv: uvs[i],
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratorKind, WorldConfig};
    use crate::generation::create;

    #[test]
    fn sample_region_produces_one_entry_per_cell() {
        let mut config = WorldConfig::default();
        config.generator = GeneratorKind::Flat;
        let generator = create(&config);
        let sample = sample_region(generator.as_ref(), 0, 0, 4);
        let expected = (LOD_CELLS_PER_SIDE * LOD_CELLS_PER_SIDE) as usize;
        assert_eq!(sample.heights.len(), expected);
        assert_eq!(sample.biomes.len(), expected);
        assert_eq!(sample.top_blocks.len(), expected);
    }

    #[test]
    fn build_region_mesh_emits_six_vertices_per_cell() {
        let mut config = WorldConfig::default();
        config.generator = GeneratorKind::Flat;
        let generator = create(&config);
        let sample = sample_region(generator.as_ref(), 0, 0, 4);
        let mesh = build_region_mesh(&sample, 4);
        let expected = (LOD_CELLS_PER_SIDE * LOD_CELLS_PER_SIDE) as usize * 6;
        assert_eq!(mesh.len(), expected);
    }

    #[test]
    fn flat_generator_produces_a_uniform_height_heightmap() {
        let mut config = WorldConfig::default();
        config.generator = GeneratorKind::Flat;
        let generator = create(&config);
        let sample = sample_region(generator.as_ref(), 2, -3, 2);
        let first = sample.heights[0];
        assert!(sample.heights.iter().all(|h| *h == first));
    }
}
