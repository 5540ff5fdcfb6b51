//! Chunk-local/world coordinate conversions.

pub const CHUNK_SIZE_X: i32 = 16;
pub const CHUNK_SIZE_Y: i32 = 256;
pub const CHUNK_SIZE_Z: i32 = 16;
pub const CHUNK_BLOCKS: usize = (CHUNK_SIZE_X * CHUNK_SIZE_Y * CHUNK_SIZE_Z) as usize;
pub const CHUNK_COLUMNS: usize = (CHUNK_SIZE_X * CHUNK_SIZE_Z) as usize;

/// Column position of a chunk, in chunk units (not blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        ChunkPos { x, z }
    }

    pub fn world_origin(self) -> (i32, i32) {
        (self.x * CHUNK_SIZE_X, self.z * CHUNK_SIZE_Z)
    }

    pub fn from_world(world_x: i32, world_z: i32) -> Self {
        ChunkPos {
            x: world_x.div_euclid(CHUNK_SIZE_X),
            z: world_z.div_euclid(CHUNK_SIZE_Z),
        }
    }

    pub fn neighbors4(self) -> [ChunkPos; 4] {
        [
            ChunkPos::new(self.x + 1, self.z),
            ChunkPos::new(self.x - 1, self.z),
            ChunkPos::new(self.x, self.z + 1),
            ChunkPos::new(self.x, self.z - 1),
        ]
    }
}

/// World-space voxel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        VoxelPos { x, y, z }
    }

    pub fn chunk(self) -> ChunkPos {
        ChunkPos::from_world(self.x, self.z)
    }

    /// Local coordinates within the owning chunk, `0..16` on X/Z, `0..256` on Y.
    pub fn local(self) -> (i32, i32, i32) {
        (
            self.x.rem_euclid(CHUNK_SIZE_X),
            self.y,
            self.z.rem_euclid(CHUNK_SIZE_Z),
        )
    }
}

/// Index into a chunk's flat `[BlockId; CHUNK_BLOCKS]` array from local
/// coordinates. Y-major so a full column is contiguous.
pub fn block_index(lx: i32, ly: i32, lz: i32) -> usize {
    debug_assert!((0..CHUNK_SIZE_X).contains(&lx));
    debug_assert!((0..CHUNK_SIZE_Y).contains(&ly));
    debug_assert!((0..CHUNK_SIZE_Z).contains(&lz));
    ((ly * CHUNK_SIZE_Z + lz) * CHUNK_SIZE_X + lx) as usize
}

/// Index into a chunk's flat per-column array (biome, height map).
pub fn column_index(lx: i32, lz: i32) -> usize {
    debug_assert!((0..CHUNK_SIZE_X).contains(&lx));
    debug_assert!((0..CHUNK_SIZE_Z).contains(&lz));
    (lz * CHUNK_SIZE_X + lx) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_to_chunk_handles_negative_coordinates() {
        assert_eq!(ChunkPos::from_world(-1, -1), ChunkPos::new(-1, -1));
        assert_eq!(ChunkPos::from_world(-16, 0), ChunkPos::new(-1, 0));
        assert_eq!(ChunkPos::from_world(15, 0), ChunkPos::new(0, 0));
    }

    #[test]
    fn local_coordinates_wrap_into_chunk_range() {
        let pos = VoxelPos::new(-1, 70, 17);
        let (lx, ly, lz) = pos.local();
        assert_eq!((lx, ly, lz), (15, 70, 1));
    }

    #[test]
    fn block_index_is_injective_over_chunk_volume() {
        let mut seen = std::collections::HashSet::new();
        for ly in 0..4 {
            for lz in 0..CHUNK_SIZE_Z {
                for lx in 0..CHUNK_SIZE_X {
                    assert!(seen.insert(block_index(lx, ly, lz)));
                }
            }
        }
    }
}
