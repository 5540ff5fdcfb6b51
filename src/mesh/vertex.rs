//! Vertex layouts emitted to the RHI (§6): 14 f32 per terrain vertex, 11 f32
//! per LOD-simplified vertex.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tile_id: f32,
    pub skylight: f32,
    pub blocklight: f32,
}

const_assert_eq!(std::mem::size_of::<TerrainVertex>(), 56);

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LodVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

const_assert_eq!(std::mem::size_of::<LodVertex>(), 44);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_vertex_is_56_bytes() {
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 56);
    }

    #[test]
    fn lod_vertex_is_44_bytes() {
        assert_eq!(std::mem::size_of::<LodVertex>(), 44);
    }
}
