//! Headless learner simulation
//!
//! Plays whole exercises against a session with a scripted learner whose
//! accuracy is lower on a chosen set of weak positions. The report shows
//! how strongly sampling shifts toward those positions.

use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::fretboard::{Fretboard, NoteToken, Position, OCTAVE};
use crate::session::{Session, SessionSummary};

/// Scripted learner behaviour
#[derive(Debug, Clone)]
pub struct LearnerModel {
    /// Chance of a correct answer on ordinary positions
    pub accuracy: f64,
    /// Chance of a correct answer on weak positions
    pub weak_accuracy: f64,
    pub weak_positions: HashSet<Position>,
}

impl LearnerModel {
    /// Accuracies must be probabilities in [0, 1]
    pub fn new(
        accuracy: f64,
        weak_accuracy: f64,
        weak_positions: impl IntoIterator<Item = Position>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            accuracy: check_probability("accuracy", accuracy)?,
            weak_accuracy: check_probability("weak accuracy", weak_accuracy)?,
            weak_positions: weak_positions.into_iter().collect(),
        })
    }

    fn accuracy_for(&self, position: Position) -> f64 {
        if self.weak_positions.contains(&position) {
            self.weak_accuracy
        } else {
            self.accuracy
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub exercises: usize,
    pub answers: usize,
    /// How often each position was quizzed, by position
    pub draws: Vec<(Position, usize)>,
    /// Share of quiz items that landed on a weak position
    pub weak_share: f64,
    /// Share a uniform sampler would have given the weak positions
    pub uniform_share: f64,
    pub summary: SessionSummary,
}

/// Parse a `string:fret` pair such as `5:4` that lies on `board`
pub fn parse_position(raw: &str, board: &Fretboard) -> anyhow::Result<Position> {
    let (string, fret) = raw
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("Expected <string>:<fret>, got '{}'", raw))?;
    let position = Position::new(string.trim().parse()?, fret.trim().parse()?);
    if !board.contains(position) {
        anyhow::bail!(
            "Position '{}' is off the board ({} strings x {} frets)",
            raw,
            board.string_count(),
            board.fret_count()
        );
    }
    Ok(position)
}

fn check_probability(name: &str, value: f64) -> anyhow::Result<f64> {
    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("{} must be between 0 and 1, got {}", name, value);
    }
    Ok(value)
}

/// Run `exercises` complete exercises with the scripted learner
pub fn run_simulation<H, R: Rng>(
    session: &mut Session<H>,
    learner: &LearnerModel,
    exercises: usize,
    rng: &mut R,
) -> SimulationReport {
    info!("Simulating {} exercises", exercises);

    let mut draws: BTreeMap<Position, usize> = BTreeMap::new();
    let mut answers = 0;

    for _ in 0..exercises {
        while let Some(item) = session.current_item() {
            let position = item.position;
            let expected = item.note.clone();
            let token = if rng.gen_bool(learner.accuracy_for(position)) {
                NoteToken::new(expected)
            } else {
                wrong_answer(session, &expected, rng)
            };

            *draws.entry(position).or_default() += 1;
            answers += 1;
            if let Err(e) = session.answer(&token) {
                debug!("Simulation stopped early: {}", e);
                break;
            }
        }
        session.restart();
    }

    let board_size = session.fretboard().positions().count();
    let weak_on_board = learner
        .weak_positions
        .iter()
        .filter(|p| session.fretboard().contains(**p))
        .count();
    let weak_hits: usize = draws
        .iter()
        .filter(|(p, _)| learner.weak_positions.contains(*p))
        .map(|(_, n)| n)
        .sum();

    SimulationReport {
        exercises,
        answers,
        draws: draws.into_iter().collect(),
        weak_share: share(weak_hits, answers),
        uniform_share: share(weak_on_board, board_size),
        summary: session.summary(learner.weak_positions.len().max(5)),
    }
}

fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Some other note of the scale
fn wrong_answer<H, R: Rng>(session: &Session<H>, expected: &str, rng: &mut R) -> NoteToken {
    let board = session.fretboard();
    let start = rng.gen_range(0..OCTAVE);
    let note = (0..OCTAVE)
        .map(|offset| board.scale_note(start + offset))
        .find(|note| *note != expected)
        .unwrap_or(expected);
    NoteToken::new(note)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DrillConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board() -> Fretboard {
        Fretboard::from_config(&DrillConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_position() {
        let board = board();
        assert_eq!(parse_position("5:4", &board).unwrap(), Position::new(5, 4));
        assert_eq!(parse_position(" 0 : 3 ", &board).unwrap(), Position::new(0, 3));
        assert!(parse_position("54", &board).is_err());
        assert!(parse_position("a:1", &board).is_err());
    }

    #[test]
    fn test_parse_position_rejects_off_board() {
        let board = board();
        let err = parse_position("9:9", &board).unwrap_err();
        assert!(err.to_string().contains("9:9"));
        assert!(parse_position("6:0", &board).is_err());
        assert!(parse_position("0:6", &board).is_err());
    }

    #[test]
    fn test_learner_rejects_bad_accuracy() {
        let none = Vec::<Position>::new;
        assert!(LearnerModel::new(f64::NAN, 0.3, none()).is_err());
        assert!(LearnerModel::new(0.9, f64::NAN, none()).is_err());
        assert!(LearnerModel::new(f64::INFINITY, 0.3, none()).is_err());
        assert!(LearnerModel::new(1.5, 0.3, none()).is_err());
        assert!(LearnerModel::new(0.9, -0.1, none()).is_err());
        assert!(LearnerModel::new(0.0, 1.0, none()).is_ok());
    }

    #[test]
    fn test_perfect_learner_floors_difficulty() {
        let mut session: Session = Session::with_seed(&DrillConfig::default(), 1).unwrap();
        let learner = LearnerModel::new(1.0, 1.0, Vec::<Position>::new()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let report = run_simulation(&mut session, &learner, 10, &mut rng);

        assert_eq!(report.answers, 80);
        assert_eq!(report.summary.exercises_completed, 10);
        assert_eq!(report.summary.ledger.total, 50);
        assert_eq!(report.summary.ledger.correct, 50);
        assert!(report.summary.hardest.iter().all(|r| r.difficulty == 0.2));
    }

    #[test]
    fn test_weak_positions_oversampled() {
        let weak = [Position::new(5, 4), Position::new(2, 1)];
        let mut session: Session = Session::with_seed(&DrillConfig::default(), 2).unwrap();
        let learner = LearnerModel::new(0.95, 0.0, weak).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let report = run_simulation(&mut session, &learner, 200, &mut rng);

        assert_eq!(report.answers, 1600);
        assert!((report.uniform_share - 2.0 / 36.0).abs() < 1e-9);
        assert!(
            report.weak_share > 2.0 * report.uniform_share,
            "weak share {} vs uniform {}",
            report.weak_share,
            report.uniform_share
        );
    }

    #[test]
    fn test_wrong_answer_differs() {
        let session: Session = Session::with_seed(&DrillConfig::default(), 3).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert_ne!(wrong_answer(&session, "E", &mut rng).as_str(), "E");
        }
    }
}
