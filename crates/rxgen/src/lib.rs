//! # rxgen - Observable Event Wrappers for C#
//!
//! rxgen is a build-time generator that finds the events declared on C#
//! types and emits wrapper classes exposing each event as a lazily
//! subscribed `IObservable<T>`.
//!
//! ## Features
//!
//! - **Instance wrappers**: `item.Events().Changed` for any type passed to `Events()`
//! - **Static wrappers**: `[assembly: GenerateStaticEventObservables(typeof(T))]`
//! - **Inheritance**: wrappers derive from the wrappers of base types with events
//! - **Generics**: type parameters and constraints carried onto wrappers
//!
//! ## Quick Start
//!
//! ```ignore
//! use rxgen::prelude::*;
//!
//! let generator = RxGen::builder()
//!     .with_extensions_namespace("ObservableEvents")
//!     .with_event_subscriber(Arc::new(LoggingSubscriber::new()))
//!     .build()?;
//!
//! let model = generator.load_model_file("model.json")?;
//! let mut host = DirectoryHost::new("obj/generated");
//!
//! let report = generator.run(&model, &mut host)?;
//! println!("{}", report.to_text());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Host compiler / CLI                    │
//! ├─────────────────────────────────────────────────────────┤
//! │                     rxgen (facade)                      │
//! │              ┌───────────────────────────┐              │
//! │              │  RxGen Builder ▶ driver   │              │
//! │              └─────────────┬─────────────┘              │
//! │                            │                            │
//! │  ┌─────────────┬───────────┴────┬──────────────────┐    │
//! │  │ rxgen-core  │ rxgen-host     │ rxgen-observe    │    │
//! │  │ (collect,   │ (sinks,        │ (events,         │    │
//! │  │  synthesize)│  cancellation) │  metrics, report)│    │
//! │  └─────────────┴────────────────┴──────────────────┘    │
//! ├─────────────────────────────────────────────────────────┤
//! │               rxgen-model (SymbolQuery)                 │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;
use std::sync::Arc;

use rxgen_core::bootstrap;
use rxgen_core::{GenerateError, GeneratorConfig};
use rxgen_host::GeneratorHost;
use rxgen_model::{ModelDocument, ProgramBuilder, ProgramModel, SymbolQuery};
use rxgen_observe::{EventDispatcher, EventSubscriber, PassReport};

pub mod driver;

pub use driver::{Requests, TypeRequest};

// Re-export from sub-crates
pub use rxgen_core;
pub use rxgen_host;
pub use rxgen_model;
pub use rxgen_observe;

/// Main entry point for rxgen.
pub struct RxGen;

impl RxGen {
    /// Create a new generator builder.
    pub fn builder() -> RxGenBuilder {
        RxGenBuilder::new()
    }

    /// Create a generator with default configuration.
    pub fn with_defaults() -> Result<Generator, RxGenError> {
        RxGenBuilder::new().build()
    }
}

/// Builder for configuring a generator.
pub struct RxGenBuilder {
    config: GeneratorConfig,
    event_subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl RxGenBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
            event_subscribers: Vec::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    // Naming

    /// Set the namespace of the extension holder and marker attribute.
    pub fn with_extensions_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config = self.config.with_extensions_namespace(namespace);
        self
    }

    /// Set the name of the factory extension method.
    pub fn with_factory_method(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_factory_method(name);
        self
    }

    // Output

    /// Collapse `(sender, EventArgs)` events to `Unit` observables.
    pub fn with_collapse_plain_event_args(mut self, enabled: bool) -> Self {
        self.config = self.config.with_collapse_plain_event_args(enabled);
        self
    }

    /// Emit the trigger declarations unit.
    pub fn with_bootstrap(mut self, enabled: bool) -> Self {
        self.config = self.config.with_bootstrap(enabled);
        self
    }

    /// Emit XML documentation comments.
    pub fn with_documentation(mut self, enabled: bool) -> Self {
        self.config = self.config.with_documentation(enabled);
        self
    }

    // Observability

    /// Add an event subscriber.
    pub fn with_event_subscriber(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.event_subscribers.push(subscriber);
        self
    }

    /// Validate the configuration and build the generator.
    pub fn build(self) -> Result<Generator, RxGenError> {
        self.config.validate()?;

        let event_dispatcher = EventDispatcher::new();
        for subscriber in self.event_subscribers {
            event_dispatcher.subscribe(subscriber);
        }

        Ok(Generator {
            config: self.config,
            event_dispatcher: Arc::new(event_dispatcher),
        })
    }
}

impl Default for RxGenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured generator.
pub struct Generator {
    config: GeneratorConfig,
    event_dispatcher: Arc<EventDispatcher>,
}

impl Generator {
    /// Get the configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Get the event dispatcher.
    pub fn event_dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.event_dispatcher
    }

    /// Build a model from a document, with the core library and this
    /// generator's trigger declarations already in place.
    ///
    /// The document must not declare the extension holder or the marker
    /// attribute itself.
    pub fn load_model(&self, document: ModelDocument) -> Result<ProgramModel, RxGenError> {
        let mut builder = ProgramBuilder::with_core_library();
        bootstrap::install(&mut builder, &self.config)?;
        builder.load_document(document)?;
        Ok(builder.build())
    }

    /// Read a model document from a JSON file and build the model.
    pub fn load_model_file(&self, path: impl AsRef<Path>) -> Result<ProgramModel, RxGenError> {
        let document = ModelDocument::from_file(path.as_ref())?;
        self.load_model(document)
    }

    /// Find the wrap requests in a program without generating anything.
    pub fn discover<Q: SymbolQuery + ?Sized>(&self, query: &Q) -> Result<Requests, GenerateError> {
        driver::discover(query, &self.config)
    }

    /// Run one generation pass, writing every unit to `host`.
    pub fn run<Q, H>(&self, query: &Q, host: &mut H) -> Result<PassReport, GenerateError>
    where
        Q: SymbolQuery + ?Sized,
        H: GeneratorHost + ?Sized,
    {
        driver::run(query, host, &self.config, &self.event_dispatcher)
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("event_dispatcher", &self.event_dispatcher)
            .finish()
    }
}

/// Errors from the rxgen facade.
#[derive(Debug, thiserror::Error)]
pub enum RxGenError {
    /// Model error.
    #[error("Model error: {0}")]
    Model(#[from] rxgen_model::ModelError),

    /// Generation error.
    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] rxgen_core::ConfigError),
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Main types
    pub use crate::{Generator, Requests, RxGen, RxGenBuilder, RxGenError, TypeRequest};

    // Core types
    pub use rxgen_core::{
        Diagnostic, GenerateError, GeneratorConfig, ReactiveNames, Severity, WrapperMode,
    };

    // Model types
    pub use rxgen_model::{ModelDocument, ProgramBuilder, ProgramModel, SymbolQuery};

    // Host types
    pub use rxgen_host::{CancellationToken, CollectingHost, DirectoryHost, GeneratorHost};

    // Observability types
    pub use rxgen_observe::{
        CollectingSubscriber, EventDispatcher, EventSubscriber, LoggingSubscriber, PassEvent,
        PassOutcome, PassReport,
    };

    // Common std types
    pub use std::sync::Arc;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxgen_host::CollectingHost;

    const DOCUMENT: &str = r#"{
        "types": [
            {
                "namespace": "Sample",
                "name": "Button",
                "events": [{ "name": "Click", "type": "System.EventHandler" }]
            }
        ],
        "invocations": [
            {
                "method": "Events",
                "containing_type": "ObservableEvents.ObservableGeneratorExtensions",
                "type_arguments": ["Sample.Button"]
            }
        ]
    }"#;

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = RxGen::builder().with_factory_method("not valid").build();
        assert!(matches!(result, Err(RxGenError::Config(_))));
    }

    #[test]
    fn test_load_model_installs_triggers() {
        let generator = RxGen::with_defaults().unwrap();
        let model = generator
            .load_model(ModelDocument::from_json(DOCUMENT).unwrap())
            .unwrap();

        assert!(model
            .resolve_metadata_name("ObservableEvents.GenerateStaticEventObservablesAttribute")
            .is_some());
        assert_eq!(generator.discover(&model).unwrap().instance.len(), 1);
    }

    #[test]
    fn test_run_from_document() {
        let generator = RxGen::builder().with_bootstrap(false).build().unwrap();
        let model = generator
            .load_model(ModelDocument::from_json(DOCUMENT).unwrap())
            .unwrap();
        let mut host = CollectingHost::new();

        let report = generator.run(&model, &mut host).unwrap();

        assert_eq!(report.units.len(), 2);
        let wrapper = host
            .source("SourceClassSample.Button-InstanceEvents.SourceGenerated.cs")
            .unwrap();
        assert!(wrapper.contains("internal partial class RxButtonEvents"));
    }

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let _generator = RxGen::builder()
            .with_event_subscriber(Arc::new(LoggingSubscriber::new()))
            .build()
            .unwrap();
    }
}
