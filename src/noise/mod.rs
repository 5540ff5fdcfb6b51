//! Layered noise sampler stack (C3): pure functions of world coordinates
//! and the world seed, each accepting a `reduction` level in `0..=3` that
//! halves the octave count per step (LOD generation samples at
//! `reduction = LOD level`).

mod stack;

pub use stack::{NoiseStack, Reduction};
