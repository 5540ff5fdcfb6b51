//! LOD chunk pyramid (C12): per-tier region maps, state machine, and the
//! job-token scheme that lets stale worker results be discarded safely.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::biome::BiomeId;
use crate::block::BlockId;
use crate::interfaces::BufferHandle;
use crate::mesh::LodVertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LodLevel {
    L1,
    L2,
    L3,
}

impl LodLevel {
    /// Region edge length in native chunks.
    pub fn region_size_chunks(self) -> i32 {
        match self {
            LodLevel::L1 => 2,
            LodLevel::L2 => 4,
            LodLevel::L3 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionKey {
    pub rx: i32,
    pub rz: i32,
    pub level: LodLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LodState {
    Empty,
    QueuedGen,
    Generating,
    Generated,
    QueuedMesh,
    Meshing,
    MeshReady,
    Uploading,
    Renderable,
    Unloading,
}

/// Identifies one generation/mesh job dispatch. A completion is discarded
/// by the scheduler when the LOD chunk's current token no longer matches
/// the token the job was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobToken(pub u32);

/// A single LOD region's bookkeeping: its state-machine position plus the
/// coarse terrain sample and GPU resources produced as it advances through
/// that machine. `heights`/`biomes`/`top_blocks` are populated once the
/// region reaches `Generated`; `mesh` once it reaches `MeshReady`;
/// `gpu_buffer` once it reaches `Renderable`.
pub struct LodChunk {
    pub state: LodState,
    pub pin_count: u32,
    pub job_token: JobToken,
    pub heights: Vec<f32>,
    pub biomes: Vec<BiomeId>,
    pub top_blocks: Vec<BlockId>,
    pub mesh: Option<Vec<LodVertex>>,
    pub gpu_buffer: Option<BufferHandle>,
}

impl LodChunk {
    fn new() -> Self {
        LodChunk {
            state: LodState::Empty,
            pin_count: 0,
            job_token: JobToken(0),
            heights: Vec::new(),
            biomes: Vec::new(),
            top_blocks: Vec::new(),
            mesh: None,
            gpu_buffer: None,
        }
    }

    pub fn can_unload(&self) -> bool {
        self.pin_count == 0
    }
}

pub struct LodPyramid {
    regions: HashMap<RegionKey, LodChunk>,
    next_token: AtomicU32,
}

impl LodPyramid {
    pub fn new() -> Self {
        LodPyramid {
            regions: HashMap::new(),
            next_token: AtomicU32::new(1),
        }
    }

    pub fn get(&self, key: RegionKey) -> Option<&LodChunk> {
        self.regions.get(&key)
    }

    pub fn get_or_insert(&mut self, key: RegionKey) -> &mut LodChunk {
        self.regions.entry(key).or_insert_with(LodChunk::new)
    }

    pub fn get_mut(&mut self, key: RegionKey) -> Option<&mut LodChunk> {
        self.regions.get_mut(&key)
    }

    pub fn transition(&mut self, key: RegionKey, state: LodState) {
        if let Some(chunk) = self.regions.get_mut(&key) {
            chunk.state = state;
        }
    }

    pub fn pin(&mut self, key: RegionKey) {
        self.get_or_insert(key).pin_count += 1;
    }

    pub fn unpin(&mut self, key: RegionKey) {
        if let Some(chunk) = self.regions.get_mut(&key) {
            chunk.pin_count = chunk.pin_count.saturating_sub(1);
        }
    }

    /// Issues a fresh token for `key`, invalidating any job already in
    /// flight for it, and returns the token to hand to the new job.
    pub fn bump_token(&mut self, key: RegionKey) -> JobToken {
        let token = JobToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.get_or_insert(key).job_token = token;
        token
    }

    /// Whether a job completion carrying `token` for `key` is still
    /// current and should be applied.
    pub fn is_current(&self, key: RegionKey, token: JobToken) -> bool {
        self.regions.get(&key).map(|c| c.job_token) == Some(token)
    }

    pub fn remove(&mut self, key: RegionKey) -> Option<LodChunk> {
        self.regions.remove(&key)
    }

    pub fn loaded_count(&self) -> usize {
        self.regions.len()
    }

    pub fn keys_for_level(&self, level: LodLevel) -> Vec<RegionKey> {
        self.regions.keys().filter(|k| k.level == level).copied().collect()
    }
}

impl Default for LodPyramid {
    fn default() -> Self {
        Self::new()
    }
}

/// A region is eligible to unload once it has left the load radius plus a
/// two-region hysteresis band and nothing pins it in place.
pub fn should_unload(dist_in_regions: f32, load_radius: f32, pin_count: u32) -> bool {
    pin_count == 0 && dist_in_regions > load_radius + 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_completions_are_rejected_after_a_token_bump() {
        let mut pyramid = LodPyramid::new();
        let key = RegionKey { rx: 1, rz: 2, level: LodLevel::L2 };
        let first = pyramid.bump_token(key);
        assert!(pyramid.is_current(key, first));

        let second = pyramid.bump_token(key);
        assert_ne!(first, second);
        assert!(!pyramid.is_current(key, first));
        assert!(pyramid.is_current(key, second));
    }

    #[test]
    fn pinned_regions_never_unload() {
        let key = RegionKey { rx: 0, rz: 0, level: LodLevel::L1 };
        assert!(!should_unload(100.0, 10.0, 1));
        let mut pyramid = LodPyramid::new();
        pyramid.pin(key);
        assert_eq!(pyramid.get(key).unwrap().pin_count, 1);
        pyramid.unpin(key);
        assert_eq!(pyramid.get(key).unwrap().pin_count, 0);
    }

    #[test]
    fn unload_requires_leaving_the_hysteresis_band() {
        assert!(!should_unload(11.0, 10.0, 0));
        assert!(!should_unload(12.0, 10.0, 0));
        assert!(should_unload(12.1, 10.0, 0));
    }
}
