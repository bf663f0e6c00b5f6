//! Error types for the client
//!
//! Only recoverable failures live here. SafeInt width violations and
//! division by zero are panics, see [`crate::safe_int`].

use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Client errors
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed integer or decimal literal
    #[error("Parse error: {0}")]
    Parse(String),

    /// LNO value below the smallest representable unit
    #[error("Underflow: {0}")]
    Underflow(String),

    /// LNO value above the largest convertible amount
    #[error("Overflow: {0}")]
    Overflow(String),

    /// Invalid pagination or query argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Key not present in the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the two LNO range failures
    pub fn is_range(&self) -> bool {
        matches!(self, Error::Underflow(_) | Error::Overflow(_))
    }
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
