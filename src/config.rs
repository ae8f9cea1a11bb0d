//! Drill configuration
//!
//! Every constant the drill depends on (tuning, scale, exercise shape,
//! ledger window, scoring bounds, presentation delays) lives here and can
//! be overridden from a `config.toml` in the `.fretdrill` directory.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{DrillError, Result};

/// File name of the drill configuration inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// How per-position difficulty turns into a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SamplingStrategy {
    /// Expand each position into `ceil(difficulty)` copies and draw uniformly
    #[default]
    Copies,
    /// Draw proportionally to the exact difficulty weight
    Weighted,
}

/// Configuration for a drill session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillConfig {
    /// Open-string notes, index 0 = highest-pitched string
    pub tuning: Vec<String>,
    /// One octave of note tokens starting at C; uppercase = natural, lowercase = flat
    pub chromatic_scale: Vec<String>,
    /// Number of frets in the drill domain (fret 0 = open string)
    pub fret_count: u8,
    /// Quiz items per exercise
    pub exercise_length: usize,
    /// Items per display group (measure)
    pub group_size: usize,
    /// Attempts retained by the performance ledger
    pub ledger_capacity: usize,
    /// Per-step decay applied to older attempts
    pub recency_decay: f64,
    /// Weight of a position with no recent attempts
    pub default_difficulty: f64,
    pub min_difficulty: f64,
    pub max_difficulty: f64,
    pub sampling: SamplingStrategy,
    /// Pause between a completed exercise and the next one
    pub restart_delay_ms: u64,
    /// How long the raw input stays flashed on an answered item
    pub flash_delay_ms: u64,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            tuning: ["E", "B", "G", "D", "A", "E"].map(String::from).to_vec(),
            chromatic_scale: ["C", "d", "D", "e", "E", "F", "g", "G", "a", "A", "b", "B"]
                .map(String::from)
                .to_vec(),
            fret_count: 6,
            exercise_length: 8,
            group_size: 4,
            ledger_capacity: 50,
            recency_decay: 0.8,
            default_difficulty: 1.0,
            min_difficulty: 0.2,
            max_difficulty: 5.0,
            sampling: SamplingStrategy::Copies,
            restart_delay_ms: 1500,
            flash_delay_ms: 300,
        }
    }
}

impl DrillConfig {
    /// Check every value against its constraints
    pub fn validate(&self) -> Result<()> {
        if self.tuning.is_empty() || self.tuning.len() > u8::MAX as usize {
            return Err(invalid("tuning must list between 1 and 255 strings"));
        }
        if self.chromatic_scale.len() != 12 {
            return Err(invalid(format!(
                "chromatic_scale must have exactly 12 notes, found {}",
                self.chromatic_scale.len()
            )));
        }
        let unique: HashSet<&str> = self.chromatic_scale.iter().map(String::as_str).collect();
        if unique.len() != 12 {
            return Err(invalid("chromatic_scale notes must be unique"));
        }
        if let Some(note) = self.tuning.iter().find(|n| !unique.contains(n.as_str())) {
            return Err(DrillError::UnknownNote(note.clone()));
        }
        if self.fret_count == 0 {
            return Err(invalid("fret_count must be at least 1"));
        }
        if self.exercise_length == 0 || self.group_size == 0 {
            return Err(invalid("exercise_length and group_size must be at least 1"));
        }
        if self.ledger_capacity == 0 {
            return Err(invalid("ledger_capacity must be at least 1"));
        }
        if !(self.recency_decay > 0.0 && self.recency_decay <= 1.0) {
            return Err(invalid("recency_decay must be in (0, 1]"));
        }
        if !(self.min_difficulty > 0.0
            && self.min_difficulty <= self.default_difficulty
            && self.default_difficulty <= self.max_difficulty)
        {
            return Err(invalid(
                "difficulties must satisfy 0 < min_difficulty <= default_difficulty <= max_difficulty",
            ));
        }
        Ok(())
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn flash_delay(&self) -> Duration {
        Duration::from_millis(self.flash_delay_ms)
    }
}

fn invalid(message: impl Into<String>) -> DrillError {
    DrillError::InvalidConfig(message.into())
}

/// Load configuration from file, falling back to defaults when absent
pub fn load_config(config_path: &Path) -> Result<DrillConfig> {
    if !config_path.exists() {
        return Ok(DrillConfig::default());
    }

    let content = std::fs::read_to_string(config_path)?;
    let config: DrillConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &DrillConfig, config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(config_path, content)?;
    Ok(())
}

/// Locate the `.fretdrill` directory: project-local first, then home
pub fn data_dir() -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let project_dir = cwd.join(".fretdrill");
    if project_dir.exists() {
        return Ok(project_dir);
    }

    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    Ok(home.join(".fretdrill"))
}
