//! Error handling for the world subsystem.
//!
//! The facade never panics on recoverable input; fallible public APIs return
//! `WorldResult<T>`. Internal invariants that genuinely cannot fail (e.g. a
//! same-thread caller holding a chunk it just loaded) use direct returns.

use thiserror::Error;

/// Errors raised by the world subsystem.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("chunk not loaded at ({cx}, {cz})")]
    ChunkNotLoaded { cx: i32, cz: i32 },

    #[error("mesh arena out of memory: requested {requested} bytes, largest free {largest_free}")]
    OutOfMemory {
        requested: usize,
        largest_free: usize,
    },

    #[error("stale job result for token {expected:?}, got {actual:?}")]
    StaleJobResult { expected: u32, actual: u32 },

    #[error("GPU device lost during {operation}")]
    DeviceLost { operation: String },

    #[error("generator aborted for chunk ({cx}, {cz})")]
    GeneratorAbort { cx: i32, cz: i32 },

    #[error("invalid configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{component} lock poisoned")]
    LockPoisoned { component: String },
}

/// Result alias used throughout the world subsystem.
pub type WorldResult<T> = Result<T, WorldError>;

impl<T> From<std::sync::PoisonError<T>> for WorldError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        WorldError::LockPoisoned {
            component: "unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_not_loaded_message() {
        let err = WorldError::ChunkNotLoaded { cx: 3, cz: -2 };
        assert_eq!(err.to_string(), "chunk not loaded at (3, -2)");
    }
}
