//! Worker pool for CPU-bound generation and meshing jobs (ambient, §5).

mod pool;

pub use pool::{channel, WorkerPool};
