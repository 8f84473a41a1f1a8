//! Error types for the table reconstruction library.
//!
//! Extraction itself never fails: missing sections, unparseable numbers and
//! malformed documents are represented in the returned tables. The errors
//! below only occur where external bytes enter the crate (token files and
//! configuration overrides).

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading tokens or configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Token with an unusable bounding box
    #[error("Invalid token at index {index}: {reason}")]
    InvalidToken {
        /// Position of the token in the input list
        index: usize,
        /// Reason the token was rejected
        reason: String,
    },

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
