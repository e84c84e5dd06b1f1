pub mod block;
pub mod message;

pub use block::{Block, BlockHeader};
pub use message::Message;
