//! rxgen Host Seam
//!
//! This crate provides the interface between a generation pass and the
//! compiler hosting it. It includes:
//!
//! - [`GeneratorHost`]: The "add source" and "report diagnostic" sinks
//! - [`CancellationToken`]: Cooperative cancellation shared across threads
//! - [`CollectingHost`]: In-memory host for tests and embedding
//! - [`DirectoryHost`]: Writes each generated unit to a directory
//!
//! # Example
//!
//! ```ignore
//! use rxgen_host::{CancellationToken, DirectoryHost, GeneratorHost};
//!
//! let token = CancellationToken::new();
//! let mut host = DirectoryHost::new("obj/generated").with_cancellation(token.clone());
//!
//! host.add_source("Foo.SourceGenerated.cs", "// <auto-generated />")?;
//! ```

pub mod cancellation;
pub mod error;
pub mod host;

// Re-export main types
pub use cancellation::CancellationToken;
pub use error::{HostError, HostResult};
pub use host::{validate_hint_name, CollectingHost, DirectoryHost, GeneratedSource, GeneratorHost};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::error::{HostError, HostResult};
    pub use crate::host::{CollectingHost, DirectoryHost, GeneratorHost};
}
