use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the chain store and the shared message queue.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("broken link at block {id}: expected predecessor {expected}, got {actual}")]
    BrokenLink {
        id: u64,
        expected: String,
        actual: String,
    },

    #[error("bad block position: expected {expected}, got {actual}")]
    BadPosition { expected: u64, actual: u64 },

    #[error("block {id} does not satisfy difficulty {difficulty}")]
    InvalidSolution { id: u64, difficulty: u32 },

    #[error(
        "timed out after {waited:?} waiting for {needed} queued messages ({available} available)"
    )]
    WaitTimeout {
        needed: usize,
        available: usize,
        waited: Duration,
    },
}
