//! Error types for device queries

use thiserror::Error;

/// Core error type for device query operations
#[derive(Error, Debug)]
pub enum DevQueryError {
    /// Base URL could not be parsed or is not usable as an API root
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Credentials cannot be used for HTTP Basic authentication
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Connection failure, timeout, or non-success HTTP status
    #[error("Transport error calling {endpoint}: {reason}")]
    Transport {
        endpoint: String,
        status: Option<u16>,
        reason: String,
    },

    /// Response body is not a valid JSON document
    #[error("Parse error: {0}")]
    Parse(String),

    /// `"d"` or the requested parameter is missing from the response
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// Value exists but is not a decimal number
    #[error("Cannot parse '{value}' as a number")]
    NumericParse { value: String },

    /// Number cannot be represented as an epoch-millisecond instant
    #[error("Invalid timestamp: {0} is not a representable epoch-millisecond value")]
    InvalidTimestamp(f64),

    /// Malformed command-line input
    #[error("Usage error: {0}")]
    Usage(String),
}

/// Result type alias for device query operations
pub type Result<T> = std::result::Result<T, DevQueryError>;

impl DevQueryError {
    /// Create a transport error for a failed HTTP exchange
    pub fn transport(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            status: None,
            reason: reason.into(),
        }
    }

    /// Create a transport error from a non-success HTTP status
    pub fn http_status(endpoint: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            status: Some(status),
            reason: reason.into(),
        }
    }

    /// HTTP status carried by a transport error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DevQueryError {
    fn from(err: serde_json::Error) -> Self {
        DevQueryError::Parse(err.to_string())
    }
}
