//! Errors raised while loading MIDI files or writing results

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse MIDI file: {0}")]
    Parse(String),
    #[error("Failed to export transcription: {0}")]
    Export(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReadError>;
