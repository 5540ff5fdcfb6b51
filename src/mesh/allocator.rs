//! Mesh Buffer Allocator (C10): sub-allocates per-chunk vertex ranges out
//! of a small number of large GPU-visible arenas, deferring physical reuse
//! until every frame that might still be reading the old range retires.

use bytemuck::cast_slice;

use crate::error::{WorldError, WorldResult};
use crate::interfaces::{BufferHandle, BufferUsage, RhiDevice};

use super::vertex::TerrainVertex;

pub const MAX_FRAMES_IN_FLIGHT: usize = 2;
const DEFAULT_ARENA_CAPACITY: usize = 1 << 16;
const VERTEX_SIZE: usize = std::mem::size_of::<TerrainVertex>();
const MAX_ARENAS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshAllocation {
    arena: usize,
    offset: usize,
    pub len: usize,
}

struct FreeRange {
    offset: usize,
    len: usize,
}

struct Arena {
    buffer: BufferHandle,
    capacity: usize,
    free_ranges: Vec<FreeRange>,
}

impl Arena {
    fn new(buffer: BufferHandle, capacity: usize) -> Self {
        Arena {
            buffer,
            capacity,
            free_ranges: vec![FreeRange { offset: 0, len: capacity }],
        }
    }

    fn take(&mut self, needed: usize) -> Option<usize> {
        let idx = self.free_ranges.iter().position(|r| r.len >= needed)?;
        let range = &mut self.free_ranges[idx];
        let offset = range.offset;
        if range.len == needed {
            self.free_ranges.remove(idx);
        } else {
            range.offset += needed;
            range.len -= needed;
        }
        Some(offset)
    }

    fn give_back(&mut self, offset: usize, len: usize) {
        self.free_ranges.push(FreeRange { offset, len });
        self.free_ranges.sort_by_key(|r| r.offset);
        let mut merged: Vec<FreeRange> = Vec::with_capacity(self.free_ranges.len());
        for range in self.free_ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if last.offset + last.len == range.offset => {
                    last.len += range.len;
                }
                _ => merged.push(range),
            }
        }
        self.free_ranges = merged;
    }

    fn largest_free(&self) -> usize {
        self.free_ranges.iter().map(|r| r.len).max().unwrap_or(0)
    }
}

/// Owns the arena set and the per-frame deferred-free queues. Single-
/// threaded: only the main thread that drives the RHI touches this.
pub struct MeshBufferAllocator<'a> {
    rhi: &'a dyn RhiDevice,
    arena_capacity: usize,
    arenas: Vec<Arena>,
    deferred_free: [Vec<MeshAllocation>; MAX_FRAMES_IN_FLIGHT],
}

impl<'a> MeshBufferAllocator<'a> {
    pub fn new(rhi: &'a dyn RhiDevice) -> Self {
        Self::with_arena_capacity(rhi, DEFAULT_ARENA_CAPACITY)
    }

    pub fn with_arena_capacity(rhi: &'a dyn RhiDevice, arena_capacity: usize) -> Self {
        MeshBufferAllocator {
            rhi,
            arena_capacity,
            arenas: Vec::new(),
            deferred_free: [Vec::new(), Vec::new()],
        }
    }

    pub fn buffer_of(&self, allocation: MeshAllocation) -> BufferHandle {
        self.arenas[allocation.arena].buffer
    }

    pub fn allocate(&mut self, vertices: &[TerrainVertex]) -> WorldResult<MeshAllocation> {
        let needed = vertices.len();
        if needed > self.arena_capacity {
            return Err(WorldError::OutOfMemory {
                requested: needed,
                largest_free: self.arena_capacity,
            });
        }

        for (index, arena) in self.arenas.iter_mut().enumerate() {
            if let Some(offset) = arena.take(needed) {
                self.rhi.update_buffer(arena.buffer, offset * VERTEX_SIZE, cast_slice(vertices));
                return Ok(MeshAllocation { arena: index, offset, len: needed });
            }
        }

        if self.arenas.len() >= MAX_ARENAS {
            let largest_free = self.arenas.iter().map(Arena::largest_free).max().unwrap_or(0);
            return Err(WorldError::OutOfMemory { requested: needed, largest_free });
        }

        let buffer = self
            .rhi
            .create_buffer(self.arena_capacity * VERTEX_SIZE, BufferUsage::Vertex);
        let mut arena = Arena::new(buffer, self.arena_capacity);
        let offset = arena.take(needed).expect("fresh arena always fits a request within capacity");
        self.rhi.update_buffer(buffer, offset * VERTEX_SIZE, cast_slice(vertices));
        self.arenas.push(arena);
        Ok(MeshAllocation { arena: self.arenas.len() - 1, offset, len: needed })
    }

    /// Marks `allocation` free but leaves its range occupied until
    /// [`retire_frame`] has been called for every frame currently in
    /// flight, so a frame still reading the old draw call is unaffected.
    pub fn free(&mut self, frame_index: usize, allocation: MeshAllocation) {
        self.deferred_free[frame_index % MAX_FRAMES_IN_FLIGHT].push(allocation);
    }

    /// Called by the main thread at the start of the frame identified by
    /// `frame_index`, physically reclaiming ranges freed that many frames
    /// ago.
    pub fn retire_frame(&mut self, frame_index: usize) {
        let slot = frame_index % MAX_FRAMES_IN_FLIGHT;
        for allocation in self.deferred_free[slot].drain(..) {
            self.arenas[allocation.arena].give_back(allocation.offset, allocation.len);
        }
    }

    /// Frees the old allocation (if any) before allocating the new one, so
    /// a chunk's peak mesh memory never holds both copies live past the
    /// in-flight window.
    pub fn reallocate(
        &mut self,
        frame_index: usize,
        old: Option<MeshAllocation>,
        vertices: &[TerrainVertex],
    ) -> WorldResult<MeshAllocation> {
        if let Some(old) = old {
            self.free(frame_index, old);
        }
        self.allocate(vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::NullRhi;

    fn vertices(n: usize) -> Vec<TerrainVertex> {
        let v = TerrainVertex {
            position: [0.0; 3],
            color: [0.0; 3],
            normal: [0.0; 3],
            uv: [0.0; 2],
            tile_id: 0.0,
            skylight: 0.0,
            blocklight: 0.0,
        };
        vec![v; n]
    }

    #[test]
    fn allocation_succeeds_within_arena_capacity() {
        let rhi = NullRhi::new();
        let mut allocator = MeshBufferAllocator::with_arena_capacity(&rhi, 1024);
        let alloc = allocator.allocate(&vertices(100)).unwrap();
        assert_eq!(alloc.len, 100);
    }

    #[test]
    fn oversized_allocation_fails_with_out_of_memory() {
        let rhi = NullRhi::new();
        let mut allocator = MeshBufferAllocator::with_arena_capacity(&rhi, 64);
        let err = allocator.allocate(&vertices(65)).unwrap_err();
        assert!(matches!(err, WorldError::OutOfMemory { requested: 65, largest_free: 64 }));
    }

    #[test]
    fn free_is_deferred_until_frames_in_flight_retire() {
        let rhi = NullRhi::new();
        let mut allocator = MeshBufferAllocator::with_arena_capacity(&rhi, 100);
        let a = allocator.allocate(&vertices(60)).unwrap();
        allocator.allocate(&vertices(40)).unwrap();
        // Arena is now full; freeing `a` does not make room until its
        // frame slot retires.
        allocator.free(0, a);
        assert!(allocator.allocate(&vertices(60)).is_err());

        allocator.retire_frame(MAX_FRAMES_IN_FLIGHT);
        let reused = allocator.allocate(&vertices(60)).unwrap();
        assert_eq!(reused.len, 60);
    }

    #[test]
    fn reallocation_frees_the_old_range_first() {
        let rhi = NullRhi::new();
        let mut allocator = MeshBufferAllocator::with_arena_capacity(&rhi, 100);
        let first = allocator.allocate(&vertices(50)).unwrap();
        let second = allocator.reallocate(0, Some(first), &vertices(50)).unwrap();
        assert_eq!(second.len, 50);
        allocator.retire_frame(MAX_FRAMES_IN_FLIGHT);
        // The retired range from `first` plus the untouched remainder
        // leaves enough free space for another full allocation.
        assert!(allocator.allocate(&vertices(50)).is_ok());
    }
}
