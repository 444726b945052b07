//! Error types for edt-ics.

use thiserror::Error;

/// Errors that can occur while fetching or publishing a timetable.
#[derive(Error, Debug)]
pub enum EdtError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credentials: set {0}")]
    MissingCredentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// The backend has no such call for this kind of request.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EdtError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, EdtError::Unsupported(_))
    }
}

/// Result type alias for edt-ics operations.
pub type EdtResult<T> = Result<T, EdtError>;
