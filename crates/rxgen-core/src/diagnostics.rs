//! Diagnostics reported to the host.

use rxgen_model::Location;
use serde::Serialize;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational.
    Info,
    /// Warning; does not fail the build.
    Warning,
    /// Error.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A static description of a diagnostic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticDescriptor {
    /// Stable identifier, e.g. `RXGEN001`.
    pub id: &'static str,
    /// Short title.
    pub title: &'static str,
    /// Message with `{0}`, `{1}`... placeholders.
    pub message_format: &'static str,
    /// Category.
    pub category: &'static str,
    /// Severity when reported.
    pub default_severity: Severity,
}

/// A requested type exposes no eligible events.
pub const EVENTS_NOT_FOUND: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "RXGEN001",
    title: "Events not found",
    message_format: "Type '{0}' does not have any public {1} events to wrap",
    category: "Compiler",
    default_severity: Severity::Warning,
};

/// Generation for one type failed unexpectedly.
pub const GENERATION_FAILED: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "RXGEN002",
    title: "Generation failed",
    message_format: "Failed to generate event observables for '{0}': {1}",
    category: "Compiler",
    default_severity: Severity::Warning,
};

/// A generated unit could not be added to the compilation.
pub const OUTPUT_CONFLICT: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "RXGEN003",
    title: "Generated output conflict",
    message_format: "Generated output for '{0}' was not added: {1}",
    category: "Compiler",
    default_severity: Severity::Warning,
};

/// A reported diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Descriptor id.
    pub id: String,
    /// Severity.
    pub severity: Severity,
    /// Formatted message.
    pub message: String,
    /// Where the diagnostic applies.
    pub location: Location,
    /// Descriptor category.
    pub category: String,
}

impl Diagnostic {
    /// Create a diagnostic from a descriptor, substituting `args` into the
    /// message placeholders by position.
    pub fn create(descriptor: &DiagnosticDescriptor, location: Location, args: &[&str]) -> Self {
        let mut message = descriptor.message_format.to_string();
        for (index, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", index), arg);
        }
        Self {
            id: descriptor.id.to_string(),
            severity: descriptor.default_severity,
            message,
            location,
            category: descriptor.category.to_string(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} {}: {}", self.location, self.severity, self.id, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_create_formats_message() {
        let diagnostic = Diagnostic::create(
            &EVENTS_NOT_FOUND,
            Location::new("Program.cs", 12, 5),
            &["Sample.Foo", "instance"],
        );
        assert_eq!(diagnostic.id, "RXGEN001");
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(
            diagnostic.message,
            "Type 'Sample.Foo' does not have any public instance events to wrap"
        );
        assert_eq!(
            diagnostic.to_string(),
            "Program.cs(12,5): warning RXGEN001: Type 'Sample.Foo' does not have any public instance events to wrap"
        );
    }

    #[test]
    fn test_diagnostic_serializes_severity_lowercase() {
        let diagnostic = Diagnostic::create(&GENERATION_FAILED, Location::none(), &["X", "boom"]);
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["id"], "RXGEN002");
    }

    #[test]
    fn test_output_conflict_names_subject_and_reason() {
        let diagnostic = Diagnostic::create(
            &OUTPUT_CONFLICT,
            Location::new("Program.cs", 3, 9),
            &["Sample.Foo", "hint name was already added"],
        );
        assert_eq!(diagnostic.id, "RXGEN003");
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(
            diagnostic.message,
            "Generated output for 'Sample.Foo' was not added: hint name was already added"
        );
    }
}
