//! LOD scheduler (C12): priority queues over the three outer tiers, an
//! upload budget drained L3 -> L2 -> L1, and pause/resume for shutdown.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use cgmath::{InnerSpace, Vector2};

use super::pyramid::{LodLevel, RegionKey};

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: RegionKey,
    priority: f32,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    /// `BinaryHeap` is a max-heap; regions with a smaller priority value
    /// should be served first, so comparison is reversed.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
    }
}

/// `dist_sq` scaled down for regions ahead of the player's velocity, so
/// they are served before regions of equal distance behind.
pub fn priority(rx: i32, rz: i32, prx: f32, prz: f32, velocity: Vector2<f32>) -> f32 {
    let offset = Vector2::new(rx as f32 - prx, rz as f32 - prz);
    let dist_sq = offset.magnitude2();
    if velocity.magnitude() <= 0.1 || dist_sq == 0.0 {
        return dist_sq;
    }
    let cos_angle = velocity.normalize().dot(offset.normalize());
    dist_sq * (1.0 - 0.5 * cos_angle)
}

pub struct Scheduler {
    l1: BinaryHeap<Entry>,
    l2: BinaryHeap<Entry>,
    l3: BinaryHeap<Entry>,
    paused: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            l1: BinaryHeap::new(),
            l2: BinaryHeap::new(),
            l3: BinaryHeap::new(),
            paused: false,
        }
    }

    pub fn enqueue(&mut self, key: RegionKey, priority: f32) {
        let entry = Entry { key, priority };
        match key.level {
            LodLevel::L1 => self.l1.push(entry),
            LodLevel::L2 => self.l2.push(entry),
            LodLevel::L3 => self.l3.push(entry),
        }
    }

    /// Pops the next job to dispatch, pumping L3 first, then L2, then L1.
    /// Returns `None` while paused or once every queue is empty.
    pub fn pop_next(&mut self) -> Option<RegionKey> {
        if self.paused {
            return None;
        }
        self.l3
            .pop()
            .or_else(|| self.l2.pop())
            .or_else(|| self.l1.pop())
            .map(|e| e.key)
    }

    /// Drains up to `budget` upload-ready regions, L3 -> L2 -> L1, for the
    /// per-frame upload budget described in the scheduler design.
    pub fn drain_uploads(&mut self, budget: usize) -> Vec<RegionKey> {
        let mut drained = Vec::with_capacity(budget);
        while drained.len() < budget {
            match self.pop_next() {
                Some(key) => drained.push(key),
                None => break,
            }
        }
        drained
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_empty(&self) -> bool {
        self.l1.is_empty() && self.l2.is_empty() && self.l3.is_empty()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(level: LodLevel, rx: i32) -> RegionKey {
        RegionKey { rx, rz: 0, level }
    }

    #[test]
    fn regions_ahead_of_velocity_get_a_smaller_priority() {
        let velocity = Vector2::new(1.0, 0.0);
        let ahead = priority(10, 0, 0.0, 0.0, velocity);
        let behind = priority(-10, 0, 0.0, 0.0, velocity);
        assert!(ahead < behind);
    }

    #[test]
    fn stationary_player_falls_back_to_plain_distance() {
        let velocity = Vector2::new(0.0, 0.0);
        let a = priority(5, 0, 0.0, 0.0, velocity);
        let b = priority(0, 5, 0.0, 0.0, velocity);
        assert_eq!(a, b);
    }

    #[test]
    fn outer_tiers_drain_before_inner_ones() {
        let mut scheduler = Scheduler::new();
        scheduler.enqueue(key(LodLevel::L1, 1), 0.0);
        scheduler.enqueue(key(LodLevel::L3, 1), 100.0);
        scheduler.enqueue(key(LodLevel::L2, 1), 50.0);

        assert_eq!(scheduler.pop_next().unwrap().level, LodLevel::L3);
        assert_eq!(scheduler.pop_next().unwrap().level, LodLevel::L2);
        assert_eq!(scheduler.pop_next().unwrap().level, LodLevel::L1);
    }

    #[test]
    fn lower_priority_value_is_served_first_within_a_tier() {
        let mut scheduler = Scheduler::new();
        scheduler.enqueue(key(LodLevel::L1, 1), 9.0);
        scheduler.enqueue(key(LodLevel::L1, 2), 1.0);
        scheduler.enqueue(key(LodLevel::L1, 3), 5.0);

        assert_eq!(scheduler.pop_next().unwrap().rx, 2);
        assert_eq!(scheduler.pop_next().unwrap().rx, 3);
        assert_eq!(scheduler.pop_next().unwrap().rx, 1);
    }

    #[test]
    fn pausing_suppresses_dequeue_until_resumed() {
        let mut scheduler = Scheduler::new();
        scheduler.enqueue(key(LodLevel::L3, 0), 0.0);
        scheduler.pause();
        assert!(scheduler.pop_next().is_none());
        scheduler.resume();
        assert!(scheduler.pop_next().is_some());
    }

    #[test]
    fn upload_budget_caps_the_drained_batch() {
        let mut scheduler = Scheduler::new();
        for rx in 0..10 {
            scheduler.enqueue(key(LodLevel::L1, rx), rx as f32);
        }
        let drained = scheduler.drain_uploads(4);
        assert_eq!(drained.len(), 4);
    }
}
