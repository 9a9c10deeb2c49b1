//! Error types for Folio

use thiserror::Error;

/// Main error type for Folio operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FolioError {
    /// Document store unreachable or misconfigured
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid configuration value or file
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Requested project was not found
    #[error("Project not found: {0}")]
    NotFound(String),

    /// Error during serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General I/O error (message only, so snapshots stay cloneable)
    #[error("IO error: {0}")]
    Io(String),

    /// Visibility observation is not available on this surface
    #[error("Observation unavailable: {0}")]
    ObservationUnavailable(String),

    /// Invalid operation for current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl FolioError {
    /// Whether this error means the store could not be reached at all
    pub fn is_connection(&self) -> bool {
        matches!(self, FolioError::Connection(_))
    }
}

impl From<std::io::Error> for FolioError {
    fn from(err: std::io::Error) -> Self {
        FolioError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for FolioError {
    fn from(err: toml::de::Error) -> Self {
        FolioError::Configuration(err.to_string())
    }
}

/// Result type alias using FolioError
pub type FolioResult<T> = Result<T, FolioError>;
