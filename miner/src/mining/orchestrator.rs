use crate::config::{MinerConfig, RaceFailurePolicy};
use crate::error::MiningError;
use crate::mining::assembler::BlockAssembler;
use crate::mining::race::MinerRace;
use crate::mining::solver::PuzzleSolver;
use chain_core::{Chain, MessageQueue};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one mining cycle, so callers can tell "nothing mined" from
/// "completed normally".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Blocks committed to the chain
    pub committed: usize,
    /// Requested blocks given up after failed races
    pub failed: usize,
}

/// Top-level sequencing of a mining cycle: genesis first, then gate on the
/// message threshold, then assemble/race/commit-or-rollback per block.
pub struct MiningCycleOrchestrator {
    chain: Chain,
    queue: Arc<MessageQueue>,
    assembler: BlockAssembler,
    race: MinerRace,
    config: MinerConfig,
}

impl MiningCycleOrchestrator {
    pub fn new(
        config: MinerConfig,
        queue: Arc<MessageQueue>,
        solver: Arc<dyn PuzzleSolver>,
    ) -> Result<Self, MiningError> {
        config.validate()?;
        Ok(Self {
            chain: Chain::new(config.difficulty),
            assembler: BlockAssembler::new(Arc::clone(&queue), &config),
            race: MinerRace::new(config.workers, solver),
            queue,
            config,
        })
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn assembler(&self) -> &BlockAssembler {
        &self.assembler
    }

    /// Attempt `blocks_to_mine` blocks. A failed attempt rolls back and
    /// never prevents the attempts that follow it.
    pub async fn run_cycle(&mut self, blocks_to_mine: usize) -> Result<CycleReport, MiningError> {
        let mut report = CycleReport::default();
        let mut remaining = blocks_to_mine;

        // The first block ever carries no messages and skips all waiting
        if self.chain.is_empty() && remaining > 0 {
            self.mine_next(&mut report).await?;
            remaining -= 1;
        }

        if remaining > 0 {
            // Don't mine until users have something to say
            self.queue
                .wait_for_at_least(
                    self.config.message_threshold,
                    self.config.poll_interval,
                    self.config.wait_timeout,
                )
                .await?;
        }

        for _ in 0..remaining {
            self.mine_next(&mut report).await?;
        }

        info!(
            "Mining cycle done: {} committed, {} failed of {} requested",
            report.committed, report.failed, blocks_to_mine
        );
        Ok(report)
    }

    async fn mine_next(&mut self, report: &mut CycleReport) -> Result<(), MiningError> {
        let mut attempts_left = match self.config.on_race_failure {
            RaceFailurePolicy::Skip => 1,
            RaceFailurePolicy::Retry { max_attempts } => max_attempts,
        };

        loop {
            let (batch, token) = self.assembler.assemble(self.chain.is_empty()).await?;
            let block_id = self.chain.len() as u64 + 1;
            let prev_fingerprint = self.chain.last_fingerprint();
            let difficulty = self.chain.difficulty();

            match self
                .race
                .run(block_id, prev_fingerprint, difficulty, batch)
                .await
            {
                Ok(block) => {
                    self.chain.append(block)?;
                    report.committed += 1;
                    return Ok(());
                }
                Err(err) => {
                    // Rollback is unconditional and synchronous; the queue
                    // must read as if this attempt never happened
                    self.assembler.rollback(token);

                    attempts_left -= 1;
                    if attempts_left == 0 {
                        warn!("Giving up on block {}: {}", block_id, err);
                        report.failed += 1;
                        return Ok(());
                    }
                    info!(
                        "Retrying block {} ({} attempts left): {}",
                        block_id, attempts_left, err
                    );
                }
            }
        }
    }
}
