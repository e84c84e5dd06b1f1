use serde::{Deserialize, Serialize};

/// A single message submitted by a producer.
///
/// Messages are immutable once created. Producers assign `id` from a shared
/// monotonically increasing counter before inserting the message into the
/// queue, so queue order and id order agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: u64,
    author: String,
    text: String,
}

impl Message {
    pub fn new(id: u64, author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            author: author.into(),
            text: text.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
