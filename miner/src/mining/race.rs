use crate::error::MiningError;
use crate::mining::assembler::CandidateBatch;
use crate::mining::solver::PuzzleSolver;
use chain_core::Block;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Runs identical solver attempts concurrently; first valid block wins.
///
/// All attempts share one cancellation flag. The winner sets it on the way
/// out; losers observe it cooperatively and drain off without the caller
/// ever blocking on them.
pub struct MinerRace {
    workers: usize,
    solver: Arc<dyn PuzzleSolver>,
}

impl MinerRace {
    pub fn new(workers: usize, solver: Arc<dyn PuzzleSolver>) -> Self {
        Self { workers, solver }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Race `workers` attempts over the same candidate payload. Returns the
    /// first successful block, or [`MiningError::RaceFailed`] if every
    /// attempt fails.
    pub async fn run(
        &self,
        block_id: u64,
        prev_fingerprint: [u8; 32],
        difficulty: u32,
        batch: CandidateBatch,
    ) -> Result<Block, MiningError> {
        info!(
            "Racing {} workers for block {} ({} messages)",
            self.workers,
            block_id,
            batch.len()
        );

        let cancel = Arc::new(AtomicBool::new(false));
        // Capacity covers every attempt so stragglers never block on send
        let (tx, mut rx) = mpsc::channel(self.workers);

        for worker_id in 0..self.workers {
            let solver = Arc::clone(&self.solver);
            let cancel = Arc::clone(&cancel);
            let batch = batch.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = solver
                    .solve(block_id, prev_fingerprint, difficulty, batch, cancel)
                    .await;
                match &result {
                    Ok(block) => info!(
                        "Worker {} solved block {} with nonce {}",
                        worker_id,
                        block.id(),
                        block.nonce()
                    ),
                    Err(e) => debug!("Worker {} attempt ended: {}", worker_id, e),
                }
                // Receiver is gone once a winner was taken; that is fine
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        let mut failures = 0;
        while let Some(result) = rx.recv().await {
            match result {
                Ok(block) => {
                    cancel.store(true, Ordering::Relaxed);
                    return Ok(block);
                }
                Err(_) => failures += 1,
            }
        }

        // Channel closed without a winner: every attempt failed
        cancel.store(true, Ordering::Relaxed);
        Err(MiningError::RaceFailed {
            block_id,
            attempts: failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;
    use crate::mining::solver::NonceSolver;
    use async_trait::async_trait;

    struct FailingSolver;

    #[async_trait]
    impl PuzzleSolver for FailingSolver {
        async fn solve(
            &self,
            _block_id: u64,
            _prev_fingerprint: [u8; 32],
            _difficulty: u32,
            _messages: CandidateBatch,
            _cancel: Arc<AtomicBool>,
        ) -> Result<Block, SolverError> {
            Err(SolverError::Exhausted)
        }
    }

    #[tokio::test]
    async fn test_first_solution_wins() {
        let race = MinerRace::new(4, Arc::new(NonceSolver::new()));
        let block = race.run(1, [0u8; 32], 0, CandidateBatch::empty()).await.unwrap();

        assert_eq!(block.id(), 1);
        assert!(block.validate());
    }

    #[tokio::test]
    async fn test_all_failures_fail_the_race() {
        let race = MinerRace::new(4, Arc::new(FailingSolver));
        let err = race
            .run(7, [0u8; 32], 0, CandidateBatch::empty())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MiningError::RaceFailed {
                block_id: 7,
                attempts: 4
            }
        ));
    }
}
