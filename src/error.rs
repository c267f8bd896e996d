//! Error types for the photo route engine.
//!
//! Only conditions a caller must act on are errors. Photos without
//! coordinates, neighborhoods with no photos, and a corrupt override store
//! are all handled in-band (filtered, empty, or logged) and never reach here.

use thiserror::Error;

/// Main error type for the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Requested neighborhood id does not exist in the collection
    #[error("Neighborhood not found: {0}")]
    NeighborhoodNotFound(String),

    /// A timestamp could not be read as an ISO-8601 instant
    #[error("Invalid timestamp: {value}")]
    InvalidTimestamp { value: String },

    /// Input document failed to parse
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O errors from a durable backend
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Durable storage rejected a read or write
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Convenience Result type using [`EngineError`]
pub type Result<T> = std::result::Result<T, EngineError>;
