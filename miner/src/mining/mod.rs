pub mod assembler;
pub mod orchestrator;
pub mod race;
pub mod solver;

pub use assembler::{BlockAssembler, CandidateBatch, RollbackToken};
pub use orchestrator::{CycleReport, MiningCycleOrchestrator};
pub use race::MinerRace;
pub use solver::{NonceSolver, PuzzleSolver};
