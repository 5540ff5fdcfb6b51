//! Procedural world generation: terrain shaping (C5), cave carving (C6),
//! decoration (C7), and the generator registry that wires them together
//! (C18).

pub mod caves;
pub mod decorate;
pub mod generator;
pub mod terrain;

pub use caves::CaveSystem;
pub use decorate::Decorator;
pub use generator::{create, Flat, GeneratorInfo, Overworld, WorldGenerator};
pub use terrain::{ColumnShape, TerrainShaper};
