//! Generation pass reports.

use serde::Serialize;
use uuid::Uuid;

use rxgen_core::{Diagnostic, Severity, WrapperMode};

use crate::metrics::MetricsSnapshot;

/// Unique identifier for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PassId(Uuid);

impl PassId {
    /// Create a new random pass ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PassId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a generated unit contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitKind {
    /// A wrapper class.
    Wrapper {
        /// Qualified name of the wrapped type.
        source_type: String,
        /// Wrapper mode.
        mode: WrapperMode,
        /// Names of the events the wrapper exposes.
        events: Vec<String>,
    },
    /// The `Events()` factory methods.
    Extensions {
        /// Number of factory methods.
        factories: usize,
    },
    /// The trigger declarations.
    Bootstrap,
}

/// A unit handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedUnit {
    /// Hint name of the unit.
    pub file_name: String,
    /// Contents.
    #[serde(flatten)]
    pub kind: UnitKind,
    /// Size of the text in bytes.
    pub bytes: usize,
}

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassOutcome {
    /// Every request was processed.
    Completed,
    /// The host cancelled the pass.
    Cancelled,
    /// The pass stopped on a fatal error.
    Failed {
        /// Error message.
        message: String,
    },
}

impl PassOutcome {
    /// Check if the pass completed.
    pub fn is_success(&self) -> bool {
        matches!(self, PassOutcome::Completed)
    }
}

/// Complete pass report.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    /// Unique pass ID.
    pub pass_id: PassId,
    /// How the pass ended.
    pub outcome: PassOutcome,
    /// Units handed to the host, in delivery order.
    pub units: Vec<GeneratedUnit>,
    /// Diagnostics reported, in order.
    pub diagnostics: Vec<Diagnostic>,
    /// Collected metrics.
    pub metrics: MetricsSnapshot,
}

impl PassReport {
    /// Create a new pass report.
    pub fn new(outcome: PassOutcome, metrics: MetricsSnapshot) -> Self {
        Self {
            pass_id: PassId::new(),
            outcome,
            units: Vec::new(),
            diagnostics: Vec::new(),
            metrics,
        }
    }

    /// Add a generated unit.
    pub fn add_unit(&mut self, unit: GeneratedUnit) {
        self.units.push(unit);
    }

    /// Add a diagnostic.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Check if the pass completed.
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Hint names of all units.
    pub fn file_names(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.file_name.as_str()).collect()
    }

    /// Wrapper units only.
    pub fn wrappers(&self) -> impl Iterator<Item = &GeneratedUnit> {
        self.units
            .iter()
            .filter(|u| matches!(u.kind, UnitKind::Wrapper { .. }))
    }

    /// Number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Format as human-readable text.
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Generation Report: {}\n", self.pass_id));
        output.push_str("Outcome: ");
        match &self.outcome {
            PassOutcome::Completed => output.push_str("Completed\n"),
            PassOutcome::Cancelled => output.push_str("Cancelled\n"),
            PassOutcome::Failed { message } => output.push_str(&format!("Failed: {}\n", message)),
        }

        output.push('\n');
        output.push_str("Requests:\n");
        output.push_str(&format!("  Instance: {}\n", self.metrics.requests.instance));
        output.push_str(&format!("  Static: {}\n", self.metrics.requests.r#static));
        output.push_str(&format!("  Duplicates: {}\n", self.metrics.requests.duplicates));

        if !self.units.is_empty() {
            output.push_str("\nGenerated:\n");
            for unit in &self.units {
                match &unit.kind {
                    UnitKind::Wrapper {
                        source_type,
                        mode,
                        events,
                    } => output.push_str(&format!(
                        "  {} ({} {}, {} events)\n",
                        unit.file_name,
                        mode,
                        source_type,
                        events.len()
                    )),
                    UnitKind::Extensions { factories } => output.push_str(&format!(
                        "  {} ({} factory methods)\n",
                        unit.file_name, factories
                    )),
                    UnitKind::Bootstrap => {
                        output.push_str(&format!("  {} (bootstrap)\n", unit.file_name))
                    }
                }
            }
        }

        output.push_str("\nMetrics:\n");
        output.push_str(&format!("  Total Time: {:?}\n", self.metrics.timing.total_time));
        output.push_str(&format!(
            "  Events Wrapped: {}\n",
            self.metrics.output.events_wrapped
        ));
        output.push_str(&format!("  Bytes Written: {}\n", self.metrics.output.total_bytes));

        if !self.diagnostics.is_empty() {
            output.push_str("\nDiagnostics:\n");
            for diag in &self.diagnostics {
                let level = match diag.severity {
                    Severity::Info => "INFO",
                    Severity::Warning => "WARN",
                    Severity::Error => "ERROR",
                };
                output.push_str(&format!(
                    "  [{}] {} {}: {}\n",
                    level, diag.id, diag.location, diag.message
                ));
            }
        }

        output
    }

    /// Format as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Format as pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
