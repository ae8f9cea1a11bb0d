//! Error types for the drill core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrillError {
    #[error("Position out of range: string {string}, fret {fret}")]
    OutOfRange { string: u8, fret: u8 },

    #[error("Note '{0}' is not in the chromatic scale")]
    UnknownNote(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No quiz item is awaiting an answer")]
    NoPendingItem,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, DrillError>;
