//! Chunk Store (C2): owns the map from chunk-column coordinates to chunks.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::block::BlockId;
use crate::error::{WorldError, WorldResult};

use super::chunk::Chunk;
use super::coords::{ChunkPos, VoxelPos, CHUNK_SIZE_Y};

/// Reader-writer protected chunk map. Generation and meshing workers read
/// neighbor chunks concurrently; the facade writes new entries under the
/// exclusive lock only when inserting or removing whole chunks. Keyed by a
/// plain integer-pair struct, so the FNV-style hash `FxHashMap` uses is a
/// strict win over SipHash's DoS resistance, which nothing here needs.
pub struct ChunkStore {
    chunks: RwLock<FxHashMap<ChunkPos, Chunk>>,
}

impl ChunkStore {
    pub fn new() -> Self {
        ChunkStore {
            chunks: RwLock::new(FxHashMap::default()),
        }
    }

    /// Ensures a chunk exists at `pos`, allocating an empty, ungenerated one
    /// if needed, and runs `f` against it under the write lock. Never fails.
    pub fn get_or_create_with<R>(&self, pos: ChunkPos, f: impl FnOnce(&mut Chunk) -> R) -> R {
        let mut chunks = self.chunks.write();
        let chunk = chunks.entry(pos).or_insert_with(|| Chunk::new(pos));
        f(chunk)
    }

    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.read().contains_key(&pos)
    }

    pub fn is_generated(&self, pos: ChunkPos) -> bool {
        self.chunks
            .read()
            .get(&pos)
            .map(|c| c.flags.generated)
            .unwrap_or(false)
    }

    pub fn with_chunk<R>(&self, pos: ChunkPos, f: impl FnOnce(&Chunk) -> R) -> Option<R> {
        self.chunks.read().get(&pos).map(f)
    }

    pub fn with_chunk_mut<R>(&self, pos: ChunkPos, f: impl FnOnce(&mut Chunk) -> R) -> Option<R> {
        self.chunks.write().get_mut(&pos).map(f)
    }

    /// Runs `f` against `pos`'s chunk and a consistent snapshot of its four
    /// cardinal neighbors (`[north, south, east, west]`, `+Z/-Z/+X/-X`)
    /// under a single read lock, for meshing and lighting boundary reads.
    pub fn with_chunk_and_neighbors<R>(
        &self,
        pos: ChunkPos,
        f: impl FnOnce(&Chunk, [Option<&Chunk>; 4]) -> R,
    ) -> Option<R> {
        let chunks = self.chunks.read();
        let chunk = chunks.get(&pos)?;
        let neighbors = [
            chunks.get(&ChunkPos::new(pos.x, pos.z + 1)),
            chunks.get(&ChunkPos::new(pos.x, pos.z - 1)),
            chunks.get(&ChunkPos::new(pos.x + 1, pos.z)),
            chunks.get(&ChunkPos::new(pos.x - 1, pos.z)),
        ];
        Some(f(chunk, neighbors))
    }

    pub fn remove(&self, pos: ChunkPos) -> Option<Chunk> {
        self.chunks.write().remove(&pos)
    }

    pub fn loaded_positions(&self) -> Vec<ChunkPos> {
        self.chunks.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `AIR` for out-of-range Y or unloaded chunks, per the spec's
    /// silent-on-invalid-coordinate policy.
    pub fn get_block(&self, pos: VoxelPos) -> BlockId {
        if !(0..CHUNK_SIZE_Y).contains(&pos.y) {
            return BlockId::AIR;
        }
        let (lx, ly, lz) = pos.local();
        self.with_chunk(pos.chunk(), |c| c.block_local(lx, ly, lz))
            .unwrap_or(BlockId::AIR)
    }

    /// Sets a block in a loaded chunk. Marks the chunk dirty, and marks any
    /// of the four neighbor chunks dirty too when the edit sits on a chunk
    /// boundary, so their boundary-facing mesh gets rebuilt.
    ///
    /// Out-of-range Y is a silent no-op. An unloaded target chunk returns
    /// `WorldError::ChunkNotLoaded` rather than panicking, since this is a
    /// public, externally reachable API; only generation/meshing code that
    /// already holds a freshly-created chunk reference uses the panic-prone
    /// fast path via `get_or_create_with`.
    pub fn set_block(&self, pos: VoxelPos, id: BlockId) -> WorldResult<()> {
        if !(0..CHUNK_SIZE_Y).contains(&pos.y) {
            return Ok(());
        }
        let chunk_pos = pos.chunk();
        let (lx, ly, lz) = pos.local();

        let touched_boundary = {
            let mut chunks = self.chunks.write();
            let chunk = chunks
                .get_mut(&chunk_pos)
                .ok_or(WorldError::ChunkNotLoaded {
                    cx: chunk_pos.x,
                    cz: chunk_pos.z,
                })?;
            chunk.set_block_local(lx, ly, lz, id);
            chunk.flags.dirty = true;
            lx == 0 || lx == 15 || lz == 0 || lz == 15
        };

        if touched_boundary {
            for neighbor in chunk_pos.neighbors4() {
                self.with_chunk_mut(neighbor, |c| c.flags.dirty = true);
            }
        }
        Ok(())
    }
}

impl Default for ChunkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_block_on_unloaded_chunk_returns_air() {
        let store = ChunkStore::new();
        assert_eq!(store.get_block(VoxelPos::new(0, 10, 0)), BlockId::AIR);
    }

    #[test]
    fn get_block_out_of_y_range_returns_air() {
        let store = ChunkStore::new();
        store.get_or_create_with(ChunkPos::new(0, 0), |_| {});
        assert_eq!(store.get_block(VoxelPos::new(0, 300, 0)), BlockId::AIR);
        assert_eq!(store.get_block(VoxelPos::new(0, -1, 0)), BlockId::AIR);
    }

    #[test]
    fn set_block_on_unloaded_chunk_errors_without_panicking() {
        let store = ChunkStore::new();
        let result = store.set_block(VoxelPos::new(0, 10, 0), BlockId::STONE);
        assert!(matches!(result, Err(WorldError::ChunkNotLoaded { .. })));
    }

    #[test]
    fn set_block_marks_boundary_neighbor_dirty() {
        let store = ChunkStore::new();
        store.get_or_create_with(ChunkPos::new(0, 0), |_| {});
        store.get_or_create_with(ChunkPos::new(1, 0), |c| c.flags.dirty = false);

        store
            .set_block(VoxelPos::new(15, 10, 4), BlockId::STONE)
            .unwrap();

        let neighbor_dirty = store.with_chunk(ChunkPos::new(1, 0), |c| c.flags.dirty).unwrap();
        assert!(neighbor_dirty);
    }

    #[test]
    fn with_chunk_and_neighbors_sees_a_consistent_snapshot() {
        let store = ChunkStore::new();
        store.get_or_create_with(ChunkPos::new(0, 0), |c| c.set_block_local(0, 5, 0, BlockId::STONE));
        store.get_or_create_with(ChunkPos::new(1, 0), |c| c.set_block_local(0, 5, 0, BlockId::DIRT));

        let (center_block, east_block) = store
            .with_chunk_and_neighbors(ChunkPos::new(0, 0), |chunk, neighbors| {
                (chunk.block_local(0, 5, 0), neighbors[2].map(|c| c.block_local(0, 5, 0)))
            })
            .unwrap();
        assert_eq!(center_block, BlockId::STONE);
        assert_eq!(east_block, Some(BlockId::DIRT));
    }

    #[test]
    fn set_block_interior_does_not_dirty_neighbors() {
        let store = ChunkStore::new();
        store.get_or_create_with(ChunkPos::new(0, 0), |_| {});
        store.get_or_create_with(ChunkPos::new(1, 0), |c| c.flags.dirty = false);

        store
            .set_block(VoxelPos::new(8, 10, 8), BlockId::STONE)
            .unwrap();

        let neighbor_dirty = store.with_chunk(ChunkPos::new(1, 0), |c| c.flags.dirty).unwrap();
        assert!(!neighbor_dirty);
    }
}
