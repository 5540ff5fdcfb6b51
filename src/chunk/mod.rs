//! Chunk storage and the block/voxel column representation (C2).

mod chunk;
mod coords;
mod store;

pub use chunk::{Chunk, ChunkFlags, LightValue, MAX_LIGHT};
pub use coords::{
    block_index, column_index, ChunkPos, VoxelPos, CHUNK_BLOCKS, CHUNK_COLUMNS, CHUNK_SIZE_X,
    CHUNK_SIZE_Y, CHUNK_SIZE_Z,
};
pub use store::ChunkStore;
