//! Error types for building and loading program models.

use thiserror::Error;

/// Errors raised while assembling a [`ProgramModel`](crate::ProgramModel).
#[derive(Debug, Error)]
pub enum ModelError {
    /// A type reference named a type that is not part of the model.
    #[error("Unknown type '{name}' referenced from {context}")]
    UnknownType {
        /// The metadata name that failed to resolve.
        name: String,
        /// Where the reference appeared.
        context: String,
    },

    /// Two types share the same metadata name.
    #[error("Duplicate type: {0}")]
    DuplicateType(String),

    /// The model document is structurally invalid.
    #[error("Invalid model document: {0}")]
    InvalidDocument(String),

    /// IO error reading a model document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error decoding a model document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
