use crate::error::SolverError;
use crate::mining::assembler::CandidateBatch;
use async_trait::async_trait;
use chain_core::Block;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

/// The proof-of-work capability consumed by the race.
///
/// An attempt may run arbitrarily long; it must check `cancel` periodically
/// and bail out with [`SolverError::Cancelled`] once it is set.
#[async_trait]
pub trait PuzzleSolver: Send + Sync {
    async fn solve(
        &self,
        block_id: u64,
        prev_fingerprint: [u8; 32],
        difficulty: u32,
        messages: CandidateBatch,
        cancel: Arc<AtomicBool>,
    ) -> Result<Block, SolverError>;
}

/// Production solver: brute-force nonce search over the block fingerprint.
///
/// Each attempt starts at a random nonce so racing workers cover different
/// regions of the search space without any coordination.
pub struct NonceSolver {
    // Attempts between cancellation checks / scheduler yields
    check_stride: u64,
}

impl NonceSolver {
    pub fn new() -> Self {
        Self {
            check_stride: 10_000,
        }
    }
}

impl Default for NonceSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PuzzleSolver for NonceSolver {
    async fn solve(
        &self,
        block_id: u64,
        prev_fingerprint: [u8; 32],
        difficulty: u32,
        messages: CandidateBatch,
        cancel: Arc<AtomicBool>,
    ) -> Result<Block, SolverError> {
        let mut block = Block::new(block_id, prev_fingerprint, difficulty, messages.to_vec());
        block.set_nonce(rand::thread_rng().gen::<u64>());

        let mut attempts: u64 = 0;
        loop {
            if block.meets_difficulty() {
                trace!(
                    "Found solution for block {} after {} attempts",
                    block_id,
                    attempts
                );
                return Ok(block);
            }

            block.increment_nonce();
            attempts += 1;

            if attempts % self.check_stride == 0 {
                if cancel.load(Ordering::Relaxed) {
                    return Err(SolverError::Cancelled);
                }
                // Let sibling attempts and the rest of the runtime run
                tokio::task::yield_now().await;
            }

            if attempts == u64::MAX {
                // Wrapped the whole nonce space without a hit
                return Err(SolverError::Exhausted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_solver_finds_solution_at_low_difficulty() {
        let solver = NonceSolver::new();
        let cancel = Arc::new(AtomicBool::new(false));

        let block = solver
            .solve(1, [0u8; 32], 1, CandidateBatch::empty(), cancel)
            .await
            .unwrap();

        assert!(block.validate());
        assert_eq!(block.id(), 1);
    }

    #[tokio::test]
    async fn test_solver_observes_cancellation() {
        // Difficulty far beyond what brute force can hit in a test run
        let solver = NonceSolver::new();
        let cancel = Arc::new(AtomicBool::new(false));

        let handle = {
            let cancel = Arc::clone(&cancel);
            tokio::spawn(async move {
                solver
                    .solve(1, [0u8; 32], 32, CandidateBatch::empty(), cancel)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.store(true, Ordering::Relaxed);

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("solver did not observe cancellation")
            .unwrap();
        assert!(matches!(result, Err(SolverError::Cancelled)));
    }
}
