//! Learning module for fretdrill
//!
//! Tracks learner attempts and turns them into sampling pressure:
//! the ledger records attempts, the scorer converts a position's recent
//! history into a difficulty weight, and the sampler draws positions in
//! proportion to those weights.

pub mod difficulty;
pub mod ledger;
pub mod sampler;

pub use difficulty::DifficultyScorer;
pub use ledger::{Attempt, LedgerStats, PerformanceLedger};
pub use sampler::WeightedSampler;
