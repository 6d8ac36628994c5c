//! Error types for the qlearn workspace

use thiserror::Error;

/// Core error type for agent configuration and environment plumbing
///
/// The learning updates themselves never fail; these variants cover the
/// surfaces around them.
#[derive(Error, Debug)]
pub enum RLError {
    /// A hyperparameter was outside its admissible range
    #[error("invalid {name}: {value} (expected {expected})")]
    InvalidHyperparameter {
        /// Hyperparameter name
        name: &'static str,
        /// Rejected value
        value: f64,
        /// Human readable admissible range
        expected: &'static str,
    },

    /// Configuration could not be assembled
    #[error("configuration error: {0}")]
    Config(String),

    /// Environment-related errors
    #[error("environment error: {0}")]
    Environment(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for qlearn operations
pub type Result<T> = std::result::Result<T, RLError>;
