//! Error types
//!
//! Configuration errors are fatal at load. Persistence errors are reported
//! to callers, which log them and fall back to fresh state.

use thiserror::Error;

/// Errors raised while loading or validating game configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A rule tag that names none of the known dice games
    #[error("unknown rule variant: {0:?}")]
    UnknownRule(String),

    /// An opponent definition that cannot be used
    #[error("malformed opponent definition {index}: {reason}")]
    MalformedOpponent { index: usize, reason: String },

    /// The configuration lists no opponents at all
    #[error("configuration defines no opponents")]
    NoOpponents,

    /// Starting money range with min above max
    #[error("invalid starting money range: {min}..={max}")]
    InvalidMoneyRange { min: u32, max: u32 },

    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is not valid JSON for the expected schema
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by the key-value store and snapshot codec
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Backing storage failed
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Blob could not be encoded or decoded
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Blob decoded but describes an impossible state
    #[error("invalid snapshot: {0}")]
    Invalid(String),

    /// Key is not a valid storage name
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}
