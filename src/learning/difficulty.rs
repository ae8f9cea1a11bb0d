//! Difficulty scoring
//!
//! Turns a position's recent history into a sampling weight. Newer
//! attempts count more: the latest gets weight 1.0 and each older one is
//! scaled by a further `decay` factor.

use std::collections::BTreeMap;
use tracing::debug;

use crate::config::DrillConfig;
use crate::fretboard::{Fretboard, Position};
use crate::learning::ledger::PerformanceLedger;

#[derive(Debug, Clone, Copy)]
pub struct DifficultyScorer {
    decay: f64,
    default_weight: f64,
    min: f64,
    max: f64,
}

impl Default for DifficultyScorer {
    fn default() -> Self {
        Self::from_config(&DrillConfig::default())
    }
}

impl DifficultyScorer {
    pub fn new(decay: f64, default_weight: f64, min: f64, max: f64) -> Self {
        Self {
            decay,
            default_weight,
            min,
            max,
        }
    }

    pub fn from_config(config: &DrillConfig) -> Self {
        Self::new(
            config.recency_decay,
            config.default_difficulty,
            config.min_difficulty,
            config.max_difficulty,
        )
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Recency-weighted success rate in [0, 1], `None` without history
    pub fn success_rate(&self, ledger: &PerformanceLedger, position: Position) -> Option<f64> {
        let attempts = ledger.attempts_for(position);
        if attempts.is_empty() {
            return None;
        }

        let k = attempts.len();
        let mut total_weight = 0.0;
        let mut success_weight = 0.0;
        for (i, attempt) in attempts.iter().enumerate() {
            let weight = self.decay.powi((k - 1 - i) as i32);
            total_weight += weight;
            if attempt.was_correct {
                success_weight += weight;
            }
        }

        Some(success_weight / total_weight)
    }

    /// Sampling weight for `position`, always within the configured bounds
    pub fn difficulty_of(&self, ledger: &PerformanceLedger, position: Position) -> f64 {
        let difficulty = match self.success_rate(ledger, position) {
            None => self.default_weight,
            Some(rate) => (self.max * (1.0 - rate)).clamp(self.min, self.max),
        };
        debug!("Difficulty for {}: {:.3}", position, difficulty);
        difficulty
    }

    /// Difficulty of every position on the board
    pub fn difficulty_map(
        &self,
        fretboard: &Fretboard,
        ledger: &PerformanceLedger,
    ) -> BTreeMap<Position, f64> {
        fretboard
            .positions()
            .map(|p| (p, self.difficulty_of(ledger, p)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::ledger::Attempt;

    const P: Position = Position::new(0, 0);

    fn ledger_with(results: &[bool]) -> PerformanceLedger {
        let mut ledger = PerformanceLedger::new(50);
        for &correct in results {
            ledger.append_attempt(Attempt::new(P, "E", correct));
        }
        ledger
    }

    #[test]
    fn test_default_weight_without_history() {
        let scorer = DifficultyScorer::default();
        let ledger = PerformanceLedger::new(50);
        assert_eq!(scorer.difficulty_of(&ledger, P), 1.0);
        assert_eq!(scorer.success_rate(&ledger, P), None);
    }

    #[test]
    fn test_all_correct_hits_floor() {
        let scorer = DifficultyScorer::default();
        assert_eq!(scorer.difficulty_of(&ledger_with(&[true; 5]), P), 0.2);
    }

    #[test]
    fn test_all_wrong_hits_ceiling() {
        let scorer = DifficultyScorer::default();
        assert_eq!(scorer.difficulty_of(&ledger_with(&[false; 5]), P), 5.0);
    }

    #[test]
    fn test_recent_attempts_dominate() {
        let scorer = DifficultyScorer::default();
        // weights: 0.8 (wrong), 1.0 (right) -> rate = 1.0 / 1.8
        let improving = ledger_with(&[false, true]);
        let rate = scorer.success_rate(&improving, P).unwrap();
        assert!((rate - 1.0 / 1.8).abs() < 1e-9);
        let expected = 5.0 * (1.0 - 1.0 / 1.8);
        assert!((scorer.difficulty_of(&improving, P) - expected).abs() < 1e-9);

        let declining = ledger_with(&[true, false]);
        assert!(scorer.difficulty_of(&declining, P) > scorer.difficulty_of(&improving, P));
    }

    #[test]
    fn test_other_positions_ignored() {
        let scorer = DifficultyScorer::default();
        let mut ledger = ledger_with(&[false; 3]);
        ledger.append_attempt(Attempt::new(Position::new(4, 2), "B", true));
        assert_eq!(scorer.difficulty_of(&ledger, P), 5.0);
        assert_eq!(scorer.difficulty_of(&ledger, Position::new(4, 2)), 0.2);
    }

    #[test]
    fn test_always_within_bounds() {
        let scorer = DifficultyScorer::default();
        let mut ledger = PerformanceLedger::new(50);
        for i in 0..120u32 {
            ledger.append_attempt(Attempt::new(P, "E", (i * 7) % 3 != 0));
            let d = scorer.difficulty_of(&ledger, P);
            assert!((0.2..=5.0).contains(&d), "difficulty {} out of bounds", d);
        }
    }

    #[test]
    fn test_difficulty_map_covers_board() {
        let board = Fretboard::from_config(&DrillConfig::default()).unwrap();
        let scorer = DifficultyScorer::default();
        let map = scorer.difficulty_map(&board, &ledger_with(&[false]));
        assert_eq!(map.len(), 36);
        assert_eq!(map[&P], 5.0);
        assert_eq!(map[&Position::new(5, 5)], 1.0);
    }
}
