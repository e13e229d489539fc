//! Error types for message parsing and enrichment

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while turning raw bytes into a message tree
#[derive(Error, Debug)]
pub enum ParseError {
    /// Failed to parse the MIME structure
    #[error("Failed to parse email structure: {0}")]
    Structure(String),

    /// Failed to read a part body
    #[error("Failed to decode content: {0}")]
    Decode(String),
}

/// Result type for parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors raised by a classifier or summarizer for one message
#[derive(Error, Debug)]
pub enum EnrichError {
    /// The enricher could not be reached or answered with a failure status
    #[error("Enricher transport failed: {0}")]
    Transport(String),

    /// The enricher answered but the payload could not be read
    #[error("Malformed enricher response: {0}")]
    MalformedResponse(String),

    /// Structured classifier output did not match the expected shape
    #[error("Invalid classification: {0}")]
    InvalidClassification(String),

    /// The call did not finish within the configured limit
    #[error("Enricher call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for EnrichError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
