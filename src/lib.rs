//! Voxel world subsystem: chunk storage, procedural generation, lighting,
//! greedy meshing, frustum culling, and multi-LOD region streaming.
//!
//! [`World`] is the single entry point most callers need; the module-level
//! types are exposed for embedders that want to drive a piece (generation,
//! meshing, lighting) directly, for example an offline world-export tool.

pub mod biome;
pub mod block;
pub mod chunk;
pub mod config;
pub mod culling;
pub mod error;
pub mod generation;
pub mod interfaces;
pub mod lighting;
pub mod lod;
pub mod math;
pub mod mesh;
pub mod noise;
pub mod stats;
pub mod worker;
mod world;

pub use block::BlockId;
pub use chunk::{Chunk, ChunkPos, ChunkStore, VoxelPos};
pub use config::WorldConfig;
pub use error::{WorldError, WorldResult};
pub use stats::WorldStatsSnapshot;
pub use world::World;
