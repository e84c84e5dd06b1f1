use crate::types::message::Message;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockHeader {
    id: u64,
    timestamp: u64,
    prev_fingerprint: [u8; 32],
    messages_digest: [u8; 32],
    difficulty: u32,
    nonce: u64,
}

/// A block in the toy ledger: a header plus the message batch it seals.
///
/// Blocks are only created by a winning solver attempt and are immutable
/// after that; the chain store takes ownership on commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    header: BlockHeader,
    messages: Vec<Message>,
}

impl BlockHeader {
    pub fn new(
        id: u64,
        prev_fingerprint: [u8; 32],
        messages_digest: [u8; 32],
        difficulty: u32,
    ) -> Self {
        Self {
            id,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            prev_fingerprint,
            messages_digest,
            difficulty,
            nonce: 0,
        }
    }

    pub fn increment_nonce(&mut self) {
        self.nonce = self.nonce.wrapping_add(1);
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(bincode::serialize(&self).unwrap_or_default());
        hasher.update(self.nonce.to_le_bytes());
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }
}

impl Block {
    pub fn new(id: u64, prev_fingerprint: [u8; 32], difficulty: u32, messages: Vec<Message>) -> Self {
        let messages_digest = Self::digest_messages(&messages);

        Self {
            header: BlockHeader::new(id, prev_fingerprint, messages_digest, difficulty),
            messages,
        }
    }

    pub fn fingerprint(&self) -> [u8; 32] {
        self.header.fingerprint()
    }

    pub fn increment_nonce(&mut self) {
        self.header.increment_nonce();
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.header.set_nonce(nonce);
    }

    pub fn id(&self) -> u64 {
        self.header.id
    }

    pub fn prev_fingerprint(&self) -> [u8; 32] {
        self.header.prev_fingerprint
    }

    pub fn difficulty(&self) -> u32 {
        self.header.difficulty
    }

    pub fn nonce(&self) -> u64 {
        self.header.nonce
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The puzzle: the fingerprint must start with `difficulty` zero hex
    /// digits (i.e. zero nibbles).
    pub fn meets_difficulty(&self) -> bool {
        fingerprint_meets_difficulty(&self.fingerprint(), self.header.difficulty)
    }

    /// Full solution check: puzzle satisfied and the message digest in the
    /// header matches the batch the block carries.
    pub fn validate(&self) -> bool {
        if !self.meets_difficulty() {
            return false;
        }
        Self::digest_messages(&self.messages) == self.header.messages_digest
    }

    fn digest_messages(messages: &[Message]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for msg in messages {
            hasher.update(bincode::serialize(msg).unwrap_or_default());
        }
        let result = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        digest
    }
}

pub fn fingerprint_meets_difficulty(fingerprint: &[u8; 32], difficulty: u32) -> bool {
    for i in 0..difficulty as usize {
        let byte = match fingerprint.get(i / 2) {
            Some(b) => *b,
            None => return false,
        };
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble != 0 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_creation() {
        let prev = [0u8; 32];
        let block = Block::new(1, prev, 0, Vec::new());

        assert_eq!(block.id(), 1);
        assert_eq!(block.prev_fingerprint(), prev);
        assert!(block.validate());
    }

    #[test]
    fn test_nonce_changes_fingerprint() {
        let mut block = Block::new(1, [0u8; 32], 0, Vec::new());
        let before = block.fingerprint();
        block.increment_nonce();
        assert_ne!(before, block.fingerprint());
        assert_eq!(block.nonce(), 1);
    }

    #[test]
    fn test_difficulty_nibbles() {
        let mut fp = [0u8; 32];
        assert!(fingerprint_meets_difficulty(&fp, 4));

        fp[0] = 0x0f; // high nibble zero, low nibble set
        assert!(fingerprint_meets_difficulty(&fp, 1));
        assert!(!fingerprint_meets_difficulty(&fp, 2));

        fp[0] = 0xf0;
        assert!(!fingerprint_meets_difficulty(&fp, 1));
    }

    #[test]
    fn test_validate_rejects_tampered_messages() {
        let msgs = vec![Message::new(1, "Jun", "hi")];
        let block = Block::new(2, [0u8; 32], 0, msgs);
        assert!(block.validate());

        // Rebuild with a different batch but keep the old header digest
        let mut tampered = block.clone();
        tampered.messages.push(Message::new(2, "Mike", "late"));
        assert!(!tampered.validate());
    }
}
