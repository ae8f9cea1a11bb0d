//! Weighted position sampling
//!
//! Two strategies share the same difficulty weights:
//! - `Copies` expands each position into `ceil(difficulty)` entries and
//!   draws one uniformly. Weights are rounded up into copy counts, so a
//!   difficulty of 1.1 samples like 2.0. This is a deliberate coarse
//!   approximation of proportional sampling.
//! - `Weighted` rolls once against the cumulative difficulty sum and so
//!   samples exactly in proportion to difficulty.
//!
//! Every position contributes a positive weight, so a draw never fails.

use rand::Rng;
use tracing::debug;

use crate::config::{DrillConfig, SamplingStrategy};
use crate::fretboard::{Fretboard, Position};
use crate::learning::difficulty::DifficultyScorer;
use crate::learning::ledger::PerformanceLedger;

#[derive(Debug, Clone, Copy)]
pub struct WeightedSampler {
    strategy: SamplingStrategy,
    scorer: DifficultyScorer,
}

impl WeightedSampler {
    pub fn new(strategy: SamplingStrategy, scorer: DifficultyScorer) -> Self {
        Self { strategy, scorer }
    }

    pub fn from_config(config: &DrillConfig) -> Self {
        Self::new(config.sampling, DifficultyScorer::from_config(config))
    }

    pub fn scorer(&self) -> &DifficultyScorer {
        &self.scorer
    }

    pub fn strategy(&self) -> SamplingStrategy {
        self.strategy
    }

    /// Draw one position from the whole board
    pub fn sample_one<R: Rng>(
        &self,
        fretboard: &Fretboard,
        ledger: &PerformanceLedger,
        rng: &mut R,
    ) -> Position {
        let position = match self.strategy {
            SamplingStrategy::Copies => self.sample_by_copies(fretboard, ledger, rng),
            SamplingStrategy::Weighted => self.sample_by_weight(fretboard, ledger, rng),
        };
        debug!("Sampled position {}", position);
        position
    }

    fn sample_by_copies<R: Rng>(
        &self,
        fretboard: &Fretboard,
        ledger: &PerformanceLedger,
        rng: &mut R,
    ) -> Position {
        let candidates = candidate_list(&self.scorer, fretboard, ledger);
        debug_assert!(!candidates.is_empty());
        candidates[rng.gen_range(0..candidates.len())]
    }

    fn sample_by_weight<R: Rng>(
        &self,
        fretboard: &Fretboard,
        ledger: &PerformanceLedger,
        rng: &mut R,
    ) -> Position {
        let weighted: Vec<(Position, f64)> = fretboard
            .positions()
            .map(|p| (p, self.scorer.difficulty_of(ledger, p)))
            .collect();
        let total: f64 = weighted.iter().map(|(_, w)| w).sum();

        let mut roll = rng.gen_range(0.0..total);
        for &(position, weight) in &weighted {
            if roll < weight {
                return position;
            }
            roll -= weight;
        }
        // Rounding can leave a sliver past the last bucket
        weighted[weighted.len() - 1].0
    }
}

/// Flat candidate list with `ceil(difficulty)` copies per position
pub fn candidate_list(
    scorer: &DifficultyScorer,
    fretboard: &Fretboard,
    ledger: &PerformanceLedger,
) -> Vec<Position> {
    let mut candidates = Vec::new();
    for position in fretboard.positions() {
        let copies = scorer.difficulty_of(ledger, position).ceil().max(1.0) as usize;
        candidates.extend(std::iter::repeat(position).take(copies));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::ledger::Attempt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board() -> Fretboard {
        Fretboard::from_config(&DrillConfig::default()).unwrap()
    }

    fn ledger_failing(position: Position, times: usize) -> PerformanceLedger {
        let mut ledger = PerformanceLedger::new(50);
        for _ in 0..times {
            ledger.append_attempt(Attempt::new(position, "E", false));
        }
        ledger
    }

    #[test]
    fn test_candidate_list_copy_counts() {
        let board = board();
        let scorer = DifficultyScorer::default();

        let fresh = candidate_list(&scorer, &board, &PerformanceLedger::new(50));
        assert_eq!(fresh.len(), 36);

        let hard = Position::new(2, 3);
        let mut ledger = ledger_failing(hard, 2);
        ledger.append_attempt(Attempt::new(Position::new(0, 0), "E", true));
        let candidates = candidate_list(&scorer, &board, &ledger);
        assert_eq!(candidates.iter().filter(|p| **p == hard).count(), 5);
        // difficulty 0.2 still yields one copy
        assert_eq!(candidates.iter().filter(|p| **p == Position::new(0, 0)).count(), 1);
        assert_eq!(candidates.len(), 36 + 4);
    }

    #[test]
    fn test_samples_stay_in_domain() {
        let board = board();
        let mut rng = StdRng::seed_from_u64(7);
        for strategy in [SamplingStrategy::Copies, SamplingStrategy::Weighted] {
            let sampler = WeightedSampler::new(strategy, DifficultyScorer::default());
            let ledger = ledger_failing(Position::new(5, 5), 3);
            for _ in 0..500 {
                let p = sampler.sample_one(&board, &ledger, &mut rng);
                assert!(board.contains(p));
            }
        }
    }

    #[test]
    fn test_hard_positions_sampled_more_often() {
        let board = board();
        let hard = Position::new(3, 2);
        let ledger = ledger_failing(hard, 4);
        let mut rng = StdRng::seed_from_u64(42);

        for strategy in [SamplingStrategy::Copies, SamplingStrategy::Weighted] {
            let sampler = WeightedSampler::new(strategy, DifficultyScorer::default());
            let draws = 20_000;
            let hits = (0..draws)
                .filter(|_| sampler.sample_one(&board, &ledger, &mut rng) == hard)
                .count();
            // expected share 5/40 = 0.125 versus 1/40 for an untouched position
            let share = hits as f64 / draws as f64;
            assert!(share > 0.09 && share < 0.16, "{:?} share {}", strategy, share);
        }
    }
}
