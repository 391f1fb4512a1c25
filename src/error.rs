//! Error types for where-am-i

use thiserror::Error;

/// Main error type for where-am-i operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Either lat/lon coordinates or ip parameter is required")]
    MissingInput,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Could not determine location for this IP address: {0}")]
    LocationUnavailable(String),

    #[error("Upstream geocoding service error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Cache store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// HTTP status code equivalent for this error
    ///
    /// Upstream failures keep the provider's status so callers can tell a
    /// throttled provider (429) from an unavailable one (503).
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingInput
            | Error::InvalidRequest(_)
            | Error::InvalidCoordinates(_)
            | Error::LocationUnavailable(_) => 400,
            Error::Upstream { status, .. } if (400..=599).contains(status) => *status,
            Error::Upstream { .. } => 502,
            _ => 500,
        }
    }

    /// Whether the caller is at fault (4xx class)
    pub fn is_user_error(&self) -> bool {
        (400..500).contains(&self.status_code()) && !matches!(self, Error::Upstream { .. })
    }
}

/// Result type alias for where-am-i operations
pub type Result<T> = std::result::Result<T, Error>;
