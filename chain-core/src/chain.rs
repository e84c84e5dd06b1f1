use crate::error::ChainError;
use crate::types::Block;
use tracing::info;

/// Predecessor fingerprint of the genesis block.
pub const GENESIS_FINGERPRINT: [u8; 32] = [0u8; 32];

/// Append-only sequence of blocks.
///
/// The chain grows by exactly one block per commit; the orchestrator's
/// sequential loop is the only writer, so no internal locking is needed.
#[derive(Debug, Default)]
pub struct Chain {
    blocks: Vec<Block>,
    difficulty: u32,
}

impl Chain {
    pub fn new(difficulty: u32) -> Self {
        Self {
            blocks: Vec::new(),
            difficulty,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Fingerprint the next block must name as its predecessor.
    pub fn last_fingerprint(&self) -> [u8; 32] {
        self.blocks
            .last()
            .map(|b| b.fingerprint())
            .unwrap_or(GENESIS_FINGERPRINT)
    }

    /// Commit a mined block. Rejects blocks that do not extend the tip.
    pub fn append(&mut self, block: Block) -> Result<(), ChainError> {
        let expected_id = self.blocks.len() as u64 + 1;
        if block.id() != expected_id {
            return Err(ChainError::BadPosition {
                expected: expected_id,
                actual: block.id(),
            });
        }

        let expected_prev = self.last_fingerprint();
        if block.prev_fingerprint() != expected_prev {
            return Err(ChainError::BrokenLink {
                id: block.id(),
                expected: hex::encode(expected_prev),
                actual: hex::encode(block.prev_fingerprint()),
            });
        }

        if !block.validate() {
            return Err(ChainError::InvalidSolution {
                id: block.id(),
                difficulty: block.difficulty(),
            });
        }

        info!(
            "Committed block {} ({} messages, fingerprint {})",
            block.id(),
            block.messages().len(),
            hex::encode(block.fingerprint())
        );
        self.blocks.push(block);
        Ok(())
    }
}
