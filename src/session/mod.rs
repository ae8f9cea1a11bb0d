//! Drill session
//!
//! Owns all learner state for one session: the fretboard, the performance
//! ledger, the current exercise and the random source. Nothing is shared
//! between sessions.
//!
//! ## States
//! - `AwaitingAnswer(i)`: item `i` of the current exercise is open
//! - `Complete`: every item has been answered; the driver schedules
//!   `restart()` after its presentation delay
//!
//! Each answer is final. There is no skip, pause or undo.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::DrillConfig;
use crate::error::{DrillError, Result};
use crate::exercise::{Exercise, ExerciseGenerator, QuizItem};
use crate::fretboard::{Fretboard, NoteToken, Position};
use crate::learning::{Attempt, LedgerStats, PerformanceLedger, WeightedSampler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingAnswer(usize),
    Complete,
}

/// Result of applying one answer
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub item_index: usize,
    pub position: Position,
    pub expected: String,
    pub given: NoteToken,
    pub correct: bool,
    /// State after the answer was recorded
    pub state: SessionState,
}

impl AnswerOutcome {
    pub fn completed(&self) -> bool {
        self.state == SessionState::Complete
    }
}

/// Difficulty snapshot of one position
#[derive(Debug, Clone, Serialize)]
pub struct PositionReport {
    pub position: Position,
    pub note: String,
    pub difficulty: f64,
    pub attempts: usize,
    pub correct: usize,
}

/// Serializable end-of-session report
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub started_at: DateTime<Utc>,
    pub exercises_completed: usize,
    pub answers: usize,
    pub ledger: LedgerStats,
    /// Highest-difficulty positions with history, hardest first
    pub hardest: Vec<PositionReport>,
}

pub struct Session<H = ()> {
    fretboard: Fretboard,
    sampler: WeightedSampler,
    generator: ExerciseGenerator,
    ledger: PerformanceLedger,
    exercise: Exercise<H>,
    state: SessionState,
    rng: StdRng,
    started_at: DateTime<Utc>,
    exercises_completed: usize,
    answers: usize,
}

impl<H> Session<H> {
    /// Start a session with an entropy-seeded random source
    pub fn new(config: &DrillConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Start a session whose sampling is reproducible
    pub fn with_seed(config: &DrillConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &DrillConfig, mut rng: StdRng) -> Result<Self> {
        config.validate()?;
        let fretboard = Fretboard::from_config(config)?;
        let sampler = WeightedSampler::from_config(config);
        let generator = ExerciseGenerator::from_config(config);
        let ledger = PerformanceLedger::new(config.ledger_capacity);
        let exercise = generator.generate(&fretboard, &sampler, &ledger, &mut rng);

        info!(
            "Session started: {} strings x {} frets, {:?} sampling",
            fretboard.string_count(),
            fretboard.fret_count(),
            sampler.strategy()
        );

        Ok(Self {
            fretboard,
            sampler,
            generator,
            ledger,
            exercise,
            state: SessionState::AwaitingAnswer(0),
            rng,
            started_at: Utc::now(),
            exercises_completed: 0,
            answers: 0,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn exercise(&self) -> &Exercise<H> {
        &self.exercise
    }

    pub fn exercise_mut(&mut self) -> &mut Exercise<H> {
        &mut self.exercise
    }

    pub fn ledger(&self) -> &PerformanceLedger {
        &self.ledger
    }

    pub fn fretboard(&self) -> &Fretboard {
        &self.fretboard
    }

    pub fn exercises_completed(&self) -> usize {
        self.exercises_completed
    }

    /// The item awaiting an answer, if any
    pub fn current_item(&self) -> Option<&QuizItem<H>> {
        match self.state {
            SessionState::AwaitingAnswer(index) => self.exercise.get(index),
            SessionState::Complete => None,
        }
    }

    /// Record the learner's answer for the current item and advance
    pub fn answer(&mut self, token: &NoteToken) -> Result<AnswerOutcome> {
        let index = match self.state {
            SessionState::AwaitingAnswer(index) => index,
            SessionState::Complete => return Err(DrillError::NoPendingItem),
        };
        let item = self.exercise.get(index).ok_or(DrillError::NoPendingItem)?;

        let correct = token.as_str() == item.note;
        let position = item.position;
        let expected = item.note.clone();
        self.ledger
            .append_attempt(Attempt::new(position, expected.clone(), correct));
        self.answers += 1;

        self.state = if index + 1 < self.exercise.len() {
            SessionState::AwaitingAnswer(index + 1)
        } else {
            self.exercises_completed += 1;
            info!("Exercise {} complete", self.exercises_completed);
            SessionState::Complete
        };

        debug!(
            "Answer '{}' for {} (expected '{}'): {}",
            token,
            position,
            expected,
            if correct { "correct" } else { "incorrect" }
        );

        Ok(AnswerOutcome {
            item_index: index,
            position,
            expected,
            given: token.clone(),
            correct,
            state: self.state,
        })
    }

    /// Replace the exercise with a freshly sampled one and reopen item 0
    ///
    /// The ledger is kept, so the new exercise reflects every answer so far.
    pub fn restart(&mut self) -> &mut Exercise<H> {
        self.exercise = self
            .generator
            .generate(&self.fretboard, &self.sampler, &self.ledger, &mut self.rng);
        self.state = SessionState::AwaitingAnswer(0);
        &mut self.exercise
    }

    /// Draw a single position using the session's ledger and random source
    pub fn sample_one(&mut self) -> Position {
        self.sampler
            .sample_one(&self.fretboard, &self.ledger, &mut self.rng)
    }

    pub fn difficulty_of(&self, position: Position) -> f64 {
        self.sampler.scorer().difficulty_of(&self.ledger, position)
    }

    /// Current difficulty of every position on the board
    pub fn difficulty_map(&self) -> BTreeMap<Position, f64> {
        self.sampler
            .scorer()
            .difficulty_map(&self.fretboard, &self.ledger)
    }

    /// Snapshot of every position with retained history, hardest first
    pub fn position_reports(&self) -> Vec<PositionReport> {
        let mut reports: Vec<PositionReport> = self
            .ledger
            .position_stats()
            .into_iter()
            .filter_map(|(position, stats)| {
                let note = self.fretboard.note_at(position).ok()?.to_string();
                Some(PositionReport {
                    position,
                    note,
                    difficulty: self.difficulty_of(position),
                    attempts: stats.total,
                    correct: stats.correct,
                })
            })
            .collect();
        reports.sort_by(|a, b| {
            b.difficulty
                .total_cmp(&a.difficulty)
                .then(a.position.cmp(&b.position))
        });
        reports
    }

    pub fn summary(&self, top: usize) -> SessionSummary {
        let mut hardest = self.position_reports();
        hardest.truncate(top);
        SessionSummary {
            started_at: self.started_at,
            exercises_completed: self.exercises_completed,
            answers: self.answers,
            ledger: self.ledger.stats(),
            hardest,
        }
    }
}
