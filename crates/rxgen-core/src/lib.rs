//! rxgen Core - Event Discovery and Wrapper Synthesis
//!
//! This crate turns the events declared on a type into C# wrapper classes
//! that expose each event as an `IObservable<T>`. It includes:
//!
//! - [`collect`]: Eligible event discovery across the inheritance chain
//! - [`classify`]: Mapping delegate signatures to observable element types
//! - [`synthesize`]: Building wrapper classes as syntax trees
//! - [`emit_factory`]: The `Events()` extension methods
//! - [`GeneratorConfig`]: Names and switches for generated code
//!
//! # Quick Start
//!
//! ```ignore
//! use rxgen_core::prelude::*;
//!
//! let config = GeneratorConfig::default();
//!
//! // Collect the public instance events of a type
//! let events = collect(&model, foo, true, false);
//!
//! // Build and render its wrapper
//! if let Some(wrapper) = synthesize(&model, &config, WrapperRequest::new(&events, WrapperMode::Instance)) {
//!     println!("{}", wrapper.render(&config));
//! }
//! ```
//!
//! # Pipeline
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌────────────┐   ┌────────┐
//! │ collector │──▶│  classify  │──▶│   synth    │──▶│ render │
//! └───────────┘   └────────────┘   └────────────┘   └────────┘
//!                                        │
//!                                        ▼
//!                                  ┌────────────┐
//!                                  │ extensions │
//!                                  └────────────┘
//! ```
//!
//! Nothing here performs I/O or holds state across calls; the orchestration
//! of a full pass lives in the `rxgen` crate.

pub mod bootstrap;
pub mod classify;
pub mod collector;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extensions;
pub mod naming;
pub mod render;
pub mod synth;
pub mod syntax;

// Re-export main types at crate root
pub use bootstrap::{bootstrap_source, bootstrap_unit, install, BootstrapTypes, BOOTSTRAP_FILE_NAME};
pub use classify::{
    classify, classify_signature, ArgumentShape, Classification, ElementType,
    Forwarding,
};
pub use collector::{
    ancestors_with_events, collect, has_eligible_events, EventDescriptor, ReturnKind, TypeEvents,
};
pub use config::{GeneratorConfig, ReactiveNames};
pub use diagnostics::{
    Diagnostic, DiagnosticDescriptor, Severity, EVENTS_NOT_FOUND, GENERATION_FAILED,
    OUTPUT_CONFLICT,
};
pub use error::{ConfigError, ConfigResult, GenerateError, Result};
pub use extensions::{
    emit_factory, extensions_unit, render_extensions, FactoryMethod, EXTENSIONS_FILE_NAME,
};
pub use synth::{
    element_display, synthesize, ParentWrapper, WrapperMode, WrapperRequest, WrapperType,
};
pub use syntax::CompilationUnit;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```ignore
/// use rxgen_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::classify::{classify, ArgumentShape, Classification};
    pub use crate::collector::{collect, EventDescriptor, TypeEvents};
    pub use crate::config::GeneratorConfig;
    pub use crate::diagnostics::{Diagnostic, Severity};
    pub use crate::error::{GenerateError, Result};
    pub use crate::extensions::{emit_factory, FactoryMethod};
    pub use crate::synth::{synthesize, WrapperMode, WrapperRequest, WrapperType};
}
