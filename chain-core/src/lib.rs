// Toyledger chain core library

// Enforce panic-free code in production
#![cfg_attr(not(test), warn(clippy::unwrap_used))]
#![cfg_attr(not(test), warn(clippy::expect_used))]
#![cfg_attr(not(test), warn(clippy::panic))]
// Test-specific allows
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod chain;
pub mod error;
pub mod queue;
pub mod types;

pub use chain::{Chain, GENESIS_FINGERPRINT};
pub use error::ChainError;
pub use queue::MessageQueue;
pub use types::{Block, BlockHeader, Message};
