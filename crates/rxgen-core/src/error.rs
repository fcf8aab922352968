//! Core error types for rxgen.
//!
//! Only pass-level failures are errors. Per-type and per-event problems are
//! reported as diagnostics or skipped, and never surface here.

use thiserror::Error;

/// Errors that abort a generation pass.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The extension-method holder type is not part of the compilation.
    ///
    /// The generator injects this type itself, so its absence points at a
    /// broken host integration rather than a user mistake.
    #[error("Cannot find the extension method holder '{0}'")]
    MissingExtensionsHolder(String),

    /// The host requested cancellation.
    #[error("Generation was cancelled")]
    Cancelled,

    /// The generator configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors in generator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configured name is not a valid C# identifier.
    #[error("Invalid identifier for '{field}': '{value}'")]
    InvalidIdentifier {
        /// The configuration field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Result type alias for generation passes.
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Result type alias for configuration checks.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
