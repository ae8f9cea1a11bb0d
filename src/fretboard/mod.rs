//! Fretboard model
//!
//! Maps a (string, fret) position to a note token given an open-string
//! tuning and a 12-tone chromatic scale starting at C.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DrillConfig;
use crate::error::{DrillError, Result};

/// Semitones in one octave
pub const OCTAVE: usize = 12;

/// A (string, fret) coordinate; string 0 is the highest-pitched string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub string: u8,
    pub fret: u8,
}

impl Position {
    pub const fn new(string: u8, fret: u8) -> Self {
        Self { string, fret }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.string, self.fret)
    }
}

/// A learner's answer, in the scale's token casing
/// (uppercase = natural, lowercase = flat)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteToken(String);

impl NoteToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fretboard with a validated tuning/scale pair
///
/// Every tuning note is resolved to its scale index at construction, so
/// `note_at` cannot fail for positions inside the domain.
#[derive(Debug, Clone)]
pub struct Fretboard {
    scale: Vec<String>,
    open_indices: Vec<usize>,
    fret_count: u8,
}

impl Fretboard {
    /// Build a fretboard from an open-string tuning and a chromatic scale
    pub fn new(tuning: &[String], scale: &[String], fret_count: u8) -> Result<Self> {
        if scale.len() != OCTAVE {
            return Err(DrillError::InvalidConfig(format!(
                "chromatic scale must have {} notes, found {}",
                OCTAVE,
                scale.len()
            )));
        }
        if tuning.is_empty() || tuning.len() > u8::MAX as usize {
            return Err(DrillError::InvalidConfig(
                "tuning must list between 1 and 255 strings".to_string(),
            ));
        }
        if fret_count == 0 {
            return Err(DrillError::InvalidConfig(
                "fret_count must be at least 1".to_string(),
            ));
        }

        let open_indices = tuning
            .iter()
            .map(|note| {
                scale
                    .iter()
                    .position(|n| n == note)
                    .ok_or_else(|| DrillError::UnknownNote(note.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            scale: scale.to_vec(),
            open_indices,
            fret_count,
        })
    }

    pub fn from_config(config: &DrillConfig) -> Result<Self> {
        Self::new(&config.tuning, &config.chromatic_scale, config.fret_count)
    }

    pub fn string_count(&self) -> u8 {
        self.open_indices.len() as u8
    }

    pub fn fret_count(&self) -> u8 {
        self.fret_count
    }

    pub fn contains(&self, position: Position) -> bool {
        position.string < self.string_count() && position.fret < self.fret_count
    }

    /// Note token sounded at `position`
    pub fn note_at(&self, position: Position) -> Result<&str> {
        if !self.contains(position) {
            return Err(DrillError::OutOfRange {
                string: position.string,
                fret: position.fret,
            });
        }
        let open = self.open_indices[position.string as usize];
        let index = (open + position.fret as usize) % OCTAVE;
        Ok(self.scale[index].as_str())
    }

    /// All positions in the domain, string-major
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let frets = self.fret_count;
        (0..self.string_count())
            .flat_map(move |string| (0..frets).map(move |fret| Position::new(string, fret)))
    }

    /// Scale token at `index`, wrapping at the octave
    pub fn scale_note(&self, index: usize) -> &str {
        &self.scale[index % OCTAVE]
    }
}
