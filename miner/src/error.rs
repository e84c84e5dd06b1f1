use chain_core::ChainError;
use thiserror::Error;

/// Outcome of a single solver attempt. Stays inside the race; only surfaces
/// to the orchestrator when every attempt in a race fails.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("attempt cancelled")]
    Cancelled,

    #[error("search space exhausted without a solution")]
    Exhausted,
}

/// Errors that can occur while mining a cycle of blocks.
#[derive(Debug, Error)]
pub enum MiningError {
    /// Every solver attempt in a race failed; the caller must roll back.
    #[error("all {attempts} solver attempts failed for block {block_id}")]
    RaceFailed { block_id: u64, attempts: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl MiningError {
    /// A race failure is recoverable: the orchestrator rolls back and may
    /// retry or skip per policy. Everything else aborts the cycle.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RaceFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(MiningError::RaceFailed {
            block_id: 2,
            attempts: 4
        }
        .is_recoverable());
        assert!(!MiningError::InvalidConfig("zero workers".into()).is_recoverable());
    }
}
