//! Error types for pcview

use thiserror::Error;

/// Main error type for pcview operations
///
/// All parsing and decoding errors are fatal to the load attempt that
/// produced them, never to the process; a previously loaded document stays
/// active when a later load fails.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed PLY header: {0}")]
    MalformedHeader(String),

    #[error("Unsupported property: {0}")]
    UnsupportedProperty(String),

    #[error("Truncated data: {0}")]
    TruncatedData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for pcview operations
pub type Result<T> = std::result::Result<T, Error>;
