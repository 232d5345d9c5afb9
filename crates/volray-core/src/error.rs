//! Error types for volray-rs.

use thiserror::Error;

/// The main error type for volray-rs operations.
#[derive(Error, Debug)]
pub enum VolrayError {
    /// A volume was declared with one or more zero dimensions.
    #[error("empty volume dimensions: {0}x{1}x{2}")]
    EmptyDimensions(u32, u32, u32),

    /// Volume data size disagrees with the declared dimensions.
    #[error("volume data size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// I/O error while reading a volume source or options file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for volray-rs operations.
pub type Result<T> = std::result::Result<T, VolrayError>;
