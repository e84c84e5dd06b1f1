use chain_core::MessageQueue;
use miner::{MinerConfig, MiningCycleOrchestrator, NonceSolver, ProducerPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = MinerConfig::default();
    let queue = Arc::new(MessageQueue::new());

    // Producers keep feeding the queue while blocks are being mined
    let producers = ProducerPool::spawn(
        Arc::clone(&queue),
        miner::producers::DEFAULT_PRODUCER_NAMES,
        Duration::from_millis(250),
    );

    let blocks = config.blocks_per_cycle;
    let mut orchestrator =
        match MiningCycleOrchestrator::new(config, queue, Arc::new(NonceSolver::new())) {
            Ok(orchestrator) => orchestrator,
            Err(e) => {
                error!("Invalid miner configuration: {}", e);
                return;
            }
        };

    match orchestrator.run_cycle(blocks).await {
        Ok(report) => info!(
            "Cycle finished: {} blocks committed, {} failed",
            report.committed, report.failed
        ),
        Err(e) => error!("Mining cycle aborted: {}", e),
    }

    producers.shutdown();

    for block in orchestrator.chain().blocks() {
        info!(
            "Block {}: {} messages, nonce {}, fingerprint {}",
            block.id(),
            block.messages().len(),
            block.nonce(),
            hex::encode(block.fingerprint())
        );
    }
}
