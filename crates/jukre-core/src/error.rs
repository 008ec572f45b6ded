//! Error types for the Juk.RE agent
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the agent
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Event journal errors
    #[error("Journal error: {0}")]
    Journal(String),

    /// Probe client errors (construction, not call outcomes)
    #[error("Probe error: {0}")]
    Probe(String),

    /// Service control errors, carrying operator-facing remediation text
    #[error("Service control error: {message}")]
    Control {
        /// Error message
        message: String,
        /// What the operator should do about it
        remediation: String,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a journal error
    pub fn journal(msg: impl Into<String>) -> Self {
        Self::Journal(msg.into())
    }

    /// Create a probe error
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Create a service control error with remediation guidance
    pub fn control(message: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self::Control {
            message: message.into(),
            remediation: remediation.into(),
        }
    }

    /// Remediation text for control errors, if any
    pub fn remediation(&self) -> Option<&str> {
        match self {
            Self::Control { remediation, .. } => Some(remediation),
            _ => None,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
