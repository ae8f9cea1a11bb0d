//! Performance ledger
//!
//! A bounded, insertion-ordered log of learner attempts. The window is
//! global: once full, the oldest attempt is evicted no matter which
//! position it belongs to.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;
use tracing::debug;

use crate::fretboard::Position;

/// One learner response to one quiz item
#[derive(Debug, Clone)]
pub struct Attempt {
    pub position: Position,
    /// Expected note for the position
    pub note: String,
    pub was_correct: bool,
    pub timestamp: Instant,
}

impl Attempt {
    pub fn new(position: Position, note: impl Into<String>, was_correct: bool) -> Self {
        Self {
            position,
            note: note.into(),
            was_correct,
            timestamp: Instant::now(),
        }
    }
}

/// Aggregate counts over the retained window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LedgerStats {
    pub total: usize,
    pub correct: usize,
    /// Fraction correct, 0.0 when empty
    pub accuracy: f64,
}

impl LedgerStats {
    fn from_counts(total: usize, correct: usize) -> Self {
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };
        Self { total, correct, accuracy }
    }
}

/// Rolling window of recent attempts
#[derive(Debug, Clone)]
pub struct PerformanceLedger {
    attempts: VecDeque<Attempt>,
    capacity: usize,
}

impl PerformanceLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            attempts: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Record an attempt, evicting the oldest one when over capacity
    pub fn append_attempt(&mut self, attempt: Attempt) {
        self.attempts.push_back(attempt);
        while self.attempts.len() > self.capacity {
            if let Some(evicted) = self.attempts.pop_front() {
                debug!(
                    "Evicted attempt for {} (correct: {})",
                    evicted.position, evicted.was_correct
                );
            }
        }
    }

    /// Attempts for `position` in the retained window, oldest first
    pub fn attempts_for(&self, position: Position) -> Vec<&Attempt> {
        self.attempts
            .iter()
            .filter(|a| a.position == position)
            .collect()
    }

    /// All retained attempts, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Attempt> {
        self.attempts.iter()
    }

    pub fn stats(&self) -> LedgerStats {
        let correct = self.attempts.iter().filter(|a| a.was_correct).count();
        LedgerStats::from_counts(self.attempts.len(), correct)
    }

    /// Per-position counts for every position with retained history
    pub fn position_stats(&self) -> BTreeMap<Position, LedgerStats> {
        let mut counts: BTreeMap<Position, (usize, usize)> = BTreeMap::new();
        for attempt in &self.attempts {
            let entry = counts.entry(attempt.position).or_default();
            entry.0 += 1;
            if attempt.was_correct {
                entry.1 += 1;
            }
        }
        counts
            .into_iter()
            .map(|(p, (total, correct))| (p, LedgerStats::from_counts(total, correct)))
            .collect()
    }
}
