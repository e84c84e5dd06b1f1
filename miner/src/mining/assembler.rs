use crate::config::MinerConfig;
use crate::error::MiningError;
use chain_core::{Message, MessageQueue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Immutable snapshot of the messages extracted for the block under
/// construction. Cheap to clone; shared read-only by every racing worker.
#[derive(Debug, Clone)]
pub struct CandidateBatch(Arc<[Message]>);

impl CandidateBatch {
    pub fn new(messages: Vec<Message>) -> Self {
        Self(messages.into())
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.0.to_vec()
    }
}

/// Exactly what must be undone to reverse one extraction: the removed
/// messages in removal order plus the watermark as it stood before assembly.
///
/// Deliberately not `Clone` — [`BlockAssembler::rollback`] consumes the
/// token, so applying it twice does not compile.
#[derive(Debug)]
pub struct RollbackToken {
    extracted: Vec<Message>,
    prior_high_water_mark: u64,
}

impl RollbackToken {
    pub fn len(&self) -> usize {
        self.extracted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extracted.is_empty()
    }
}

/// Turns queue contents into a [`CandidateBatch`] and can undo that
/// extraction. The only component that mutates the shared queue or the
/// high-water-mark counter.
pub struct BlockAssembler {
    queue: Arc<MessageQueue>,
    min_batch: usize,
    max_batch: usize,
    poll_interval: Duration,
    wait_timeout: Option<Duration>,
    high_water_mark: u64,
}

impl BlockAssembler {
    pub fn new(queue: Arc<MessageQueue>, config: &MinerConfig) -> Self {
        Self {
            queue,
            min_batch: config.min_batch,
            max_batch: config.max_batch,
            poll_interval: config.poll_interval,
            wait_timeout: config.wait_timeout,
            high_water_mark: 0,
        }
    }

    /// Id of the most recently extracted message for the block under
    /// construction.
    pub fn high_water_mark(&self) -> u64 {
        self.high_water_mark
    }

    /// Build the candidate batch for the next block.
    ///
    /// Genesis (`chain_is_empty`) skips waiting and produces an empty batch;
    /// otherwise this blocks until `min_batch` messages are pending, then
    /// extracts up to `max_batch` of them in one critical section.
    pub async fn assemble(
        &mut self,
        chain_is_empty: bool,
    ) -> Result<(CandidateBatch, RollbackToken), MiningError> {
        let prior_high_water_mark = self.high_water_mark;

        if chain_is_empty {
            return Ok((
                CandidateBatch::empty(),
                RollbackToken {
                    extracted: Vec::new(),
                    prior_high_water_mark,
                },
            ));
        }

        self.queue
            .wait_for_at_least(self.min_batch, self.poll_interval, self.wait_timeout)
            .await?;

        let extracted = self.queue.extract_up_to(self.max_batch);
        if let Some(last) = extracted.last() {
            self.high_water_mark = last.id();
        }
        debug!(
            "Assembled batch of {} messages (watermark {} -> {})",
            extracted.len(),
            prior_high_water_mark,
            self.high_water_mark
        );

        let token = RollbackToken {
            extracted: extracted.clone(),
            prior_high_water_mark,
        };
        Ok((CandidateBatch::new(extracted), token))
    }

    /// Undo one extraction: the queue head and the watermark read exactly as
    /// they did before the matching [`assemble`](Self::assemble) call.
    pub fn rollback(&mut self, token: RollbackToken) {
        warn!(
            "Rolling back {} extracted messages (watermark {} -> {})",
            token.extracted.len(),
            self.high_water_mark,
            token.prior_high_water_mark
        );
        self.high_water_mark = token.prior_high_water_mark;
        self.queue.restore_front(token.extracted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: u64) -> Message {
        Message::new(id, "Mike", format!("message {id}"))
    }

    fn test_config() -> MinerConfig {
        MinerConfig {
            min_batch: 2,
            max_batch: 3,
            poll_interval: Duration::from_millis(10),
            wait_timeout: Some(Duration::from_secs(1)),
            ..MinerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_genesis_batch_is_empty_even_with_pending_messages() {
        let queue = Arc::new(MessageQueue::new());
        queue.push_back(msg(1));
        queue.push_back(msg(2));

        let mut assembler = BlockAssembler::new(Arc::clone(&queue), &test_config());
        let (batch, token) = assembler.assemble(true).await.unwrap();

        assert!(batch.is_empty());
        assert!(token.is_empty());
        assert_eq!(queue.len(), 2);
        assert_eq!(assembler.high_water_mark(), 0);
    }

    #[tokio::test]
    async fn test_assemble_caps_batch_and_advances_watermark() {
        let queue = Arc::new(MessageQueue::new());
        for id in 1..=5 {
            queue.push_back(msg(id));
        }

        let mut assembler = BlockAssembler::new(Arc::clone(&queue), &test_config());
        let (batch, _token) = assembler.assemble(false).await.unwrap();

        assert_eq!(
            batch.messages().iter().map(Message::id).collect::<Vec<_>>(),
            [1, 2, 3]
        );
        assert_eq!(assembler.high_water_mark(), 3);
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_rollback_restores_queue_and_watermark() {
        let queue = Arc::new(MessageQueue::new());
        for id in 1..=4 {
            queue.push_back(msg(id));
        }

        let mut assembler = BlockAssembler::new(Arc::clone(&queue), &test_config());
        let (_batch, token) = assembler.assemble(false).await.unwrap();
        assert_eq!(queue.len(), 1);

        assembler.rollback(token);

        assert_eq!(assembler.high_water_mark(), 0);
        let all = queue.extract_up_to(10);
        assert_eq!(all.iter().map(Message::id).collect::<Vec<_>>(), [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_assemble_times_out_on_starved_queue() {
        let queue = Arc::new(MessageQueue::new());
        queue.push_back(msg(1));

        let config = MinerConfig {
            wait_timeout: Some(Duration::from_millis(50)),
            ..test_config()
        };
        let mut assembler = BlockAssembler::new(queue, &config);

        let err = assembler.assemble(false).await.unwrap_err();
        assert!(matches!(err, MiningError::Chain(_)));
    }
}
