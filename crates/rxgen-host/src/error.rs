//! Error types for generator hosts.

use thiserror::Error;

/// Errors raised by a [`GeneratorHost`](crate::GeneratorHost).
#[derive(Debug, Error)]
pub enum HostError {
    /// A source unit could not be written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A hint name is not usable as a file name.
    #[error("Invalid file name '{name}': {reason}")]
    InvalidFileName {
        /// The rejected hint name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The host asked the pass to stop.
    #[error("Generation cancelled by host")]
    Cancelled,
}

/// Result type for host operations.
pub type HostResult<T> = std::result::Result<T, HostError>;
