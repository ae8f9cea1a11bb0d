//! Exercise generation
//!
//! An exercise is a fixed-length run of quiz items drawn independently
//! from the weighted sampler and split into display groups (measures of
//! `group_size` beats). Repeated positions are kept as drawn.

use rand::Rng;
use tracing::info;

use crate::config::DrillConfig;
use crate::fretboard::{Fretboard, Position};
use crate::learning::{PerformanceLedger, WeightedSampler};

/// One quiz slot
///
/// `handle` belongs to the renderer: it is attached after generation and
/// passed back on every presentation update, never inspected here.
#[derive(Debug, Clone)]
pub struct QuizItem<H = ()> {
    pub group_index: usize,
    pub sub_index: usize,
    pub position: Position,
    pub note: String,
    pub handle: Option<H>,
}

/// An ordered sequence of quiz items
#[derive(Debug, Clone)]
pub struct Exercise<H = ()> {
    items: Vec<QuizItem<H>>,
}

impl<H> Exercise<H> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QuizItem<H>> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[QuizItem<H>] {
        &self.items
    }

    /// Mutable access for the renderer to attach handles
    pub fn items_mut(&mut self) -> &mut [QuizItem<H>] {
        &mut self.items
    }

    /// Number of display groups
    pub fn group_count(&self) -> usize {
        self.items
            .last()
            .map(|item| item.group_index + 1)
            .unwrap_or(0)
    }
}

/// Builds exercises from the sampler and the fretboard
#[derive(Debug, Clone, Copy)]
pub struct ExerciseGenerator {
    length: usize,
    group_size: usize,
}

impl ExerciseGenerator {
    pub fn new(length: usize, group_size: usize) -> Self {
        Self {
            length,
            group_size: group_size.max(1),
        }
    }

    pub fn from_config(config: &DrillConfig) -> Self {
        Self::new(config.exercise_length, config.group_size)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Draw a fresh exercise
    pub fn generate<H, R: Rng>(
        &self,
        fretboard: &Fretboard,
        sampler: &WeightedSampler,
        ledger: &PerformanceLedger,
        rng: &mut R,
    ) -> Exercise<H> {
        let items = (0..self.length)
            .map(|i| {
                let position = sampler.sample_one(fretboard, ledger, rng);
                QuizItem {
                    group_index: i / self.group_size,
                    sub_index: i % self.group_size,
                    position,
                    note: note_for(fretboard, position),
                    handle: None,
                }
            })
            .collect();

        info!("Generated exercise of {} items", self.length);
        Exercise { items }
    }
}

/// Sampled positions are always on the board; anything else is a caller bug
fn note_for(fretboard: &Fretboard, position: Position) -> String {
    match fretboard.note_at(position) {
        Ok(note) => note.to_string(),
        Err(e) => panic!("sampler produced an invalid position: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generate(seed: u64) -> (Fretboard, Exercise) {
        let config = DrillConfig::default();
        let board = Fretboard::from_config(&config).unwrap();
        let sampler = WeightedSampler::from_config(&config);
        let ledger = PerformanceLedger::new(config.ledger_capacity);
        let mut rng = StdRng::seed_from_u64(seed);
        let exercise = ExerciseGenerator::from_config(&config).generate(&board, &sampler, &ledger, &mut rng);
        (board, exercise)
    }

    #[test]
    fn test_exercise_shape() {
        let (_, exercise) = generate(1);
        let slots: Vec<(usize, usize)> = exercise
            .items()
            .iter()
            .map(|i| (i.group_index, i.sub_index))
            .collect();
        assert_eq!(
            slots,
            vec![(0, 0), (0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2), (1, 3)]
        );
        assert_eq!(exercise.group_count(), 2);
    }

    #[test]
    fn test_notes_match_fretboard() {
        for seed in 0..20 {
            let (board, exercise) = generate(seed);
            assert_eq!(exercise.len(), 8);
            for item in exercise.items() {
                assert_eq!(item.note, board.note_at(item.position).unwrap());
                assert!(item.handle.is_none());
            }
        }
    }

    #[test]
    fn test_uneven_final_group() {
        let config = DrillConfig::default();
        let board = Fretboard::from_config(&config).unwrap();
        let sampler = WeightedSampler::from_config(&config);
        let ledger = PerformanceLedger::new(10);
        let mut rng = StdRng::seed_from_u64(3);
        let exercise: Exercise<u32> =
            ExerciseGenerator::new(5, 2).generate(&board, &sampler, &ledger, &mut rng);
        let last = exercise.get(4).unwrap();
        assert_eq!((last.group_index, last.sub_index), (2, 0));
        assert_eq!(exercise.group_count(), 3);
    }
}
