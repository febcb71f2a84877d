//! Error types for keyscribe

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyscribeError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Malformed note #{index}: {reason}")]
    MalformedNote { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, KeyscribeError>;
