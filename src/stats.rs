//! Atomic counters for diagnostics, exposed read-only to callers and tests.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct WorldStats {
    chunks_generated: AtomicU64,
    chunks_meshed: AtomicU64,
    uploads_this_frame: AtomicU64,
    jobs_cancelled: AtomicU64,
    gpu_faults: AtomicU64,
}

/// Point-in-time snapshot of [`WorldStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStatsSnapshot {
    pub chunks_generated: u64,
    pub chunks_meshed: u64,
    pub uploads_this_frame: u64,
    pub jobs_cancelled: u64,
    pub gpu_faults: u64,
}

impl WorldStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_chunk_generated(&self) {
        self.chunks_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunk_meshed(&self) {
        self.chunks_meshed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upload(&self) {
        self.uploads_this_frame.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset_frame_counters(&self) {
        self.uploads_this_frame.store(0, Ordering::Relaxed);
    }

    pub fn record_job_cancelled(&self) {
        self.jobs_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_gpu_fault(&self) {
        self.gpu_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> WorldStatsSnapshot {
        WorldStatsSnapshot {
            chunks_generated: self.chunks_generated.load(Ordering::Relaxed),
            chunks_meshed: self.chunks_meshed.load(Ordering::Relaxed),
            uploads_this_frame: self.uploads_this_frame.load(Ordering::Relaxed),
            jobs_cancelled: self.jobs_cancelled.load(Ordering::Relaxed),
            gpu_faults: self.gpu_faults.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_and_reset() {
        let stats = WorldStats::new();
        stats.record_chunk_generated();
        stats.record_upload();
        stats.record_upload();
        let snap = stats.snapshot();
        assert_eq!(snap.chunks_generated, 1);
        assert_eq!(snap.uploads_this_frame, 2);
        stats.reset_frame_counters();
        assert_eq!(stats.snapshot().uploads_this_frame, 0);
        assert_eq!(stats.snapshot().chunks_generated, 1);
    }
}
