use chain_core::{Message, MessageQueue};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

pub const DEFAULT_PRODUCER_NAMES: &[&str] = &["Jun", "Mike"];

/// Named producer actors feeding the shared queue.
///
/// Each producer runs as its own task and draws message ids from one shared
/// counter, so ids are unique and monotonically increasing across producers.
pub struct ProducerPool {
    handles: Vec<JoinHandle<()>>,
}

impl ProducerPool {
    pub fn spawn(queue: Arc<MessageQueue>, names: &[&str], base_interval: Duration) -> Self {
        let next_id = Arc::new(AtomicU64::new(1));

        let handles = names
            .iter()
            .map(|name| {
                let queue = Arc::clone(&queue);
                let next_id = Arc::clone(&next_id);
                let name = name.to_string();
                tokio::spawn(async move {
                    let mut sent = 0u64;
                    loop {
                        let id = next_id.fetch_add(1, Ordering::SeqCst);
                        sent += 1;
                        trace!("Producer {} sending message {}", name, id);
                        queue.push_back(Message::new(
                            id,
                            name.clone(),
                            format!("{name} message #{sent}"),
                        ));

                        let jitter = rand::thread_rng()
                            .gen_range(0..=base_interval.as_millis().max(1) as u64);
                        tokio::time::sleep(base_interval + Duration::from_millis(jitter)).await;
                    }
                })
            })
            .collect();

        Self { handles }
    }

    /// Stop all producers. In-flight pushes complete; nothing new arrives.
    pub fn shutdown(self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
