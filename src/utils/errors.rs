//! Error types for formbridge
//!
//! All error types use thiserror for clean error handling.
//! SECURITY: Error messages MUST NOT contain passwords or sensitive data.

use std::path::PathBuf;
use std::time::Duration;

/// Errors raised while discovering forms on disk
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Bad form definition {}: {reason}", path.display())]
    BadFormDefinition { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormError {
    /// Shorthand for a definition rejected by a validator
    pub fn bad_definition(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FormError::BadFormDefinition {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from the OpenRosa HTTP session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),

    #[error("Malformed authentication challenge: {0}")]
    Challenge(String),

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

/// Errors from credential handling
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Invalid username format: {0}")]
    InvalidUsername(String),
}
