// Toyledger miner library

// Enforce panic-free code in production
#![cfg_attr(not(test), warn(clippy::unwrap_used))]
#![cfg_attr(not(test), warn(clippy::expect_used))]
#![cfg_attr(not(test), warn(clippy::panic))]
// Test-specific allows
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod error;
pub mod mining;
pub mod producers;

pub use config::{MinerConfig, RaceFailurePolicy};
pub use error::{MiningError, SolverError};
pub use mining::assembler::{BlockAssembler, CandidateBatch, RollbackToken};
pub use mining::orchestrator::{CycleReport, MiningCycleOrchestrator};
pub use mining::race::MinerRace;
pub use mining::solver::{NonceSolver, PuzzleSolver};
pub use producers::ProducerPool;

pub const DEFAULT_MIN_BATCH: usize = 5;
pub const DEFAULT_MAX_BATCH: usize = 10;
pub const DEFAULT_MESSAGE_THRESHOLD: usize = 5;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_BLOCKS_PER_CYCLE: usize = 5;
// Leading zero hex digits a fingerprint needs to solve the puzzle
pub const DEFAULT_DIFFICULTY: u32 = 4;
