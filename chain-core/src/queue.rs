use crate::error::ChainError;
use crate::types::Message;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::trace;

/// Thread-safe FIFO queue of pending messages, shared between producers and
/// the mining side.
///
/// Every mutation runs in its own short critical section; waiters are woken
/// through a [`Notify`] on push instead of busy polling. A poisoned lock can
/// only result from a panic while holding it, which the crate forbids, so
/// lock acquisition falls back to the inner value on poison.
#[derive(Debug, Default)]
pub struct MessageQueue {
    inner: Mutex<VecDeque<Message>>,
    notify: Notify,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the tail. Never blocks, never fails.
    pub fn push_back(&self, msg: Message) {
        {
            let mut queue = self.lock();
            trace!("Queued message {} from {}", msg.id(), msg.author());
            queue.push_back(msg);
        }
        self.notify.notify_waiters();
    }

    /// Current count. May be stale the instant after it returns.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Atomically remove up to `max` messages from the head, in queue order.
    /// Returns fewer than `max` if the queue is shorter.
    pub fn extract_up_to(&self, max: usize) -> Vec<Message> {
        let mut queue = self.lock();
        let n = queue.len().min(max);
        queue.drain(..n).collect()
    }

    /// Atomically re-insert messages at the head, in the extraction order
    /// they were removed, so the head reads exactly as before extraction.
    ///
    /// Contract: the messages were extracted from this queue and nothing has
    /// been re-inserted ahead of them since.
    pub fn restore_front(&self, msgs: Vec<Message>) {
        let mut queue = self.lock();
        if let (Some(last), Some(front)) = (msgs.last(), queue.front()) {
            debug_assert!(
                last.id() < front.id(),
                "restore would break id ordering: restoring {} in front of {}",
                last.id(),
                front.id()
            );
        }
        for msg in msgs.into_iter().rev() {
            queue.push_front(msg);
        }
    }

    /// Wait until the queue holds at least `needed` messages.
    ///
    /// Woken by pushes; `poll` bounds re-check latency, `timeout` (when set)
    /// converts starvation into [`ChainError::WaitTimeout`].
    pub async fn wait_for_at_least(
        &self,
        needed: usize,
        poll: Duration,
        timeout: Option<Duration>,
    ) -> Result<(), ChainError> {
        let started = Instant::now();
        loop {
            let notified = self.notify.notified();

            let available = self.len();
            if available >= needed {
                return Ok(());
            }

            let waited = started.elapsed();
            if let Some(limit) = timeout {
                if waited >= limit {
                    return Err(ChainError::WaitTimeout {
                        needed,
                        available,
                        waited,
                    });
                }
            }

            trace!(
                "Waiting for queue to fill: {} of {} messages",
                available,
                needed
            );
            tokio::select! {
                _ = notified => {}
                _ = tokio::time::sleep(poll) => {}
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Message>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn msg(id: u64) -> Message {
        Message::new(id, "Jun", format!("message {id}"))
    }

    #[test]
    fn test_fifo_extraction() {
        let queue = MessageQueue::new();
        for id in 1..=5 {
            queue.push_back(msg(id));
        }

        let batch = queue.extract_up_to(3);
        assert_eq!(batch.iter().map(Message::id).collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(queue.len(), 2);

        // Shorter queue than max: take what is there
        let rest = queue.extract_up_to(10);
        assert_eq!(rest.iter().map(Message::id).collect::<Vec<_>>(), [4, 5]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_extract_then_restore_is_identity() {
        let queue = MessageQueue::new();
        for id in 1..=6 {
            queue.push_back(msg(id));
        }

        let batch = queue.extract_up_to(4);
        queue.restore_front(batch);

        let all = queue.extract_up_to(10);
        assert_eq!(
            all.iter().map(Message::id).collect::<Vec<_>>(),
            [1, 2, 3, 4, 5, 6]
        );
    }

    #[test]
    fn test_restore_with_concurrent_tail_pushes() {
        let queue = MessageQueue::new();
        queue.push_back(msg(1));
        queue.push_back(msg(2));

        let batch = queue.extract_up_to(2);
        // A producer appends while the extraction is out being mined
        queue.push_back(msg(3));
        queue.restore_front(batch);

        let all = queue.extract_up_to(10);
        assert_eq!(all.iter().map(Message::id).collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_wait_woken_by_push() {
        let queue = Arc::new(MessageQueue::new());

        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                queue
                    .wait_for_at_least(2, Duration::from_millis(100), Some(Duration::from_secs(5)))
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push_back(msg(1));
        queue.push_back(msg(2));

        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let queue = MessageQueue::new();
        queue.push_back(msg(1));

        let err = queue
            .wait_for_at_least(
                3,
                Duration::from_millis(10),
                Some(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ChainError::WaitTimeout {
                needed: 3,
                available: 1,
                ..
            }
        ));
    }
}
