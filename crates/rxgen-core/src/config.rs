//! Configuration types for the generator.
//!
//! Every name the generator emits or matches against lives here and is
//! passed explicitly to the functions that need it.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Configuration for a generation pass.
///
/// Deserializes from TOML or JSON with every field optional:
///
/// ```toml
/// extensions_namespace = "MyApp.Events"
/// collapse_plain_event_args = false
///
/// [reactive]
/// observable = "global::System.IObservable"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Namespace holding the extension-method class and the static marker
    /// attribute. Empty for the global namespace.
    pub extensions_namespace: String,

    /// Name of the partial static class that collects factory methods.
    pub extensions_class: String,

    /// The sentinel method name recognised at call sites.
    pub factory_method: String,

    /// Class name of the assembly-level static marker attribute.
    pub static_attribute: String,

    /// Expose sender/`System.EventArgs` events as unit signals.
    ///
    /// With this off, such events surface as streams of `EventArgs`.
    pub collapse_plain_event_args: bool,

    /// Emit the holder class and marker attribute declarations.
    pub emit_bootstrap: bool,

    /// Emit XML documentation comments on generated members.
    pub emit_documentation: bool,

    /// Emit `#nullable enable` at the top of generated units.
    pub emit_nullable_directive: bool,

    /// Names of the reactive library types used in generated code.
    pub reactive: ReactiveNames,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            extensions_namespace: "ObservableEvents".to_string(),
            extensions_class: "ObservableGeneratorExtensions".to_string(),
            factory_method: "Events".to_string(),
            static_attribute: "GenerateStaticEventObservablesAttribute".to_string(),
            collapse_plain_event_args: true,
            emit_bootstrap: true,
            emit_documentation: true,
            emit_nullable_directive: true,
            reactive: ReactiveNames::default(),
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extensions namespace.
    pub fn with_extensions_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.extensions_namespace = namespace.into();
        self
    }

    /// Set the extension-method holder class name.
    pub fn with_extensions_class(mut self, name: impl Into<String>) -> Self {
        self.extensions_class = name.into();
        self
    }

    /// Set the sentinel factory method name.
    pub fn with_factory_method(mut self, name: impl Into<String>) -> Self {
        self.factory_method = name.into();
        self
    }

    /// Set the static marker attribute class name.
    pub fn with_static_attribute(mut self, name: impl Into<String>) -> Self {
        self.static_attribute = name.into();
        self
    }

    /// Enable or disable the plain `EventArgs` collapse.
    pub fn with_collapse_plain_event_args(mut self, enabled: bool) -> Self {
        self.collapse_plain_event_args = enabled;
        self
    }

    /// Enable or disable bootstrap declarations.
    pub fn with_bootstrap(mut self, enabled: bool) -> Self {
        self.emit_bootstrap = enabled;
        self
    }

    /// Enable or disable documentation comments.
    pub fn with_documentation(mut self, enabled: bool) -> Self {
        self.emit_documentation = enabled;
        self
    }

    /// Enable or disable the nullable directive.
    pub fn with_nullable_directive(mut self, enabled: bool) -> Self {
        self.emit_nullable_directive = enabled;
        self
    }

    /// Set the reactive library names.
    pub fn with_reactive(mut self, reactive: ReactiveNames) -> Self {
        self.reactive = reactive;
        self
    }

    /// A configuration that keeps the raw classifier output and expects the
    /// host to declare the trigger types itself.
    pub fn strict() -> Self {
        Self {
            collapse_plain_event_args: false,
            emit_bootstrap: false,
            ..Self::default()
        }
    }

    /// A configuration producing the smallest output: no documentation and
    /// no nullable directive.
    pub fn minimal() -> Self {
        Self {
            emit_documentation: false,
            emit_nullable_directive: false,
            ..Self::default()
        }
    }

    /// Metadata name of the extension-method holder class.
    pub fn holder_metadata_name(&self) -> String {
        qualify(&self.extensions_namespace, &self.extensions_class)
    }

    /// Metadata name of the static marker attribute.
    pub fn static_attribute_metadata_name(&self) -> String {
        qualify(&self.extensions_namespace, &self.static_attribute)
    }

    /// Check that all configured names are usable in generated code.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.extensions_namespace.is_empty() {
            for segment in self.extensions_namespace.split('.') {
                check_identifier("extensions_namespace", segment, &self.extensions_namespace)?;
            }
        }
        check_identifier("extensions_class", &self.extensions_class, &self.extensions_class)?;
        check_identifier("factory_method", &self.factory_method, &self.factory_method)?;
        check_identifier("static_attribute", &self.static_attribute, &self.static_attribute)?;

        if self.extensions_class == self.static_attribute {
            return Err(ConfigError::InvalidConfig(
                "extensions_class and static_attribute must differ".to_string(),
            ));
        }

        self.reactive.validate()
    }
}

/// Fully qualified names of the reactive library members used by
/// generated wrappers. Names are written as emitted, with `global::`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactiveNames {
    /// The observable interface, without type arguments.
    pub observable: String,
    /// The `Observable.Create` factory.
    pub create: String,
    /// The `Disposable.Create` factory.
    pub disposable_create: String,
    /// The unit payload type.
    pub unit: String,
    /// The unit payload value.
    pub unit_default: String,
}

impl Default for ReactiveNames {
    fn default() -> Self {
        Self {
            observable: "global::System.IObservable".to_string(),
            create: "global::System.Reactive.Linq.Observable.Create".to_string(),
            disposable_create: "global::System.Reactive.Disposables.Disposable.Create".to_string(),
            unit: "global::System.Reactive.Unit".to_string(),
            unit_default: "global::System.Reactive.Unit.Default".to_string(),
        }
    }
}

impl ReactiveNames {
    fn validate(&self) -> ConfigResult<()> {
        let fields = [
            ("reactive.observable", &self.observable),
            ("reactive.create", &self.create),
            ("reactive.disposable_create", &self.disposable_create),
            ("reactive.unit", &self.unit),
            ("reactive.unit_default", &self.unit_default),
        ];
        for (field, value) in fields {
            let dotted = value.strip_prefix("global::").unwrap_or(value);
            for segment in dotted.split('.') {
                check_identifier(field, segment, value)?;
            }
        }
        Ok(())
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

fn check_identifier(field: &'static str, segment: &str, value: &str) -> ConfigResult<()> {
    let mut chars = segment.chars();
    let valid = match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {
            chars.all(|c| c == '_' || c.is_alphanumeric())
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
    }
}
