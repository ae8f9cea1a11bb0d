//! fretdrill - adaptive fretboard note-naming drill
//!
//! Quizzes (string, fret) positions, records whether each answer was
//! right, and biases future quizzes toward the positions the learner
//! keeps missing.

pub mod config;
pub mod driver;
pub mod error;
pub mod exercise;
pub mod fretboard;
pub mod learning;
pub mod session;

pub use config::{load_config, save_config, DrillConfig, SamplingStrategy};
pub use error::{DrillError, Result};
pub use exercise::{Exercise, ExerciseGenerator, QuizItem};
pub use fretboard::{Fretboard, NoteToken, Position};
pub use learning::{Attempt, DifficultyScorer, LedgerStats, PerformanceLedger, WeightedSampler};
pub use session::{AnswerOutcome, Session, SessionState, SessionSummary};
