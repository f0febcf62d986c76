//! Error types for minpair

use std::io;
use thiserror::Error;

/// Main error type for minpair
#[derive(Error, Debug)]
pub enum MinpairError {
    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Word catalog error: {0}")]
    Catalog(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for minpair operations
pub type Result<T> = std::result::Result<T, MinpairError>;

impl From<String> for MinpairError {
    fn from(s: String) -> Self {
        MinpairError::Other(s)
    }
}

impl From<&str> for MinpairError {
    fn from(s: &str) -> Self {
        MinpairError::Other(s.to_string())
    }
}
