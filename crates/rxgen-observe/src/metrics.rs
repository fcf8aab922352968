//! Metrics collection during a generation pass.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use rxgen_core::{Severity, WrapperMode};

/// Collects metrics during a generation pass.
#[derive(Default)]
pub struct MetricsCollector {
    /// Timing metrics.
    timing: RwLock<TimingMetrics>,
    /// Trigger discovery metrics.
    requests: RwLock<RequestMetrics>,
    /// Generated output metrics.
    output: RwLock<OutputMetrics>,
    /// Diagnostic metrics.
    diagnostics: RwLock<DiagnosticMetrics>,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of the pass.
    pub fn record_start(&self) {
        self.timing.write().start_time = Some(Instant::now());
    }

    /// Record the end of the pass.
    pub fn record_end(&self) {
        let mut timing = self.timing.write();
        timing.end_time = Some(Instant::now());
        if let (Some(start), Some(end)) = (timing.start_time, timing.end_time) {
            timing.total_time = end.duration_since(start);
        }
    }

    /// Record time spent discovering triggers.
    pub fn record_discovery_time(&self, duration: Duration) {
        self.timing.write().discovery_time = duration;
    }

    /// Record a distinct request.
    pub fn record_request(&self, mode: WrapperMode) {
        let mut requests = self.requests.write();
        match mode {
            WrapperMode::Instance => requests.instance += 1,
            WrapperMode::Static => requests.r#static += 1,
        }
    }

    /// Record a request dropped as a repeat.
    pub fn record_duplicate(&self) {
        self.requests.write().duplicates += 1;
    }

    /// Record a generated wrapper and its event count.
    pub fn record_wrapper(&self, mode: WrapperMode, events: usize) {
        let mut output = self.output.write();
        match mode {
            WrapperMode::Instance => output.instance_wrappers += 1,
            WrapperMode::Static => output.static_wrappers += 1,
        }
        output.events_wrapped += events as u64;
    }

    /// Record an emitted factory method.
    pub fn record_factory(&self) {
        self.output.write().factory_methods += 1;
    }

    /// Record a source unit handed to the host.
    pub fn record_source(&self, bytes: usize) {
        let mut output = self.output.write();
        output.source_units += 1;
        output.total_bytes += bytes as u64;
    }

    /// Record a reported diagnostic.
    pub fn record_diagnostic(&self, id: &str, severity: Severity) {
        let mut diagnostics = self.diagnostics.write();
        match severity {
            Severity::Info => diagnostics.info += 1,
            Severity::Warning => diagnostics.warnings += 1,
            Severity::Error => diagnostics.errors += 1,
        }
        *diagnostics.by_id.entry(id.to_string()).or_insert(0) += 1;
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timing: self.timing.read().clone(),
            requests: self.requests.read().clone(),
            output: self.output.read().clone(),
            diagnostics: self.diagnostics.read().clone(),
        }
    }

    /// Reset all metrics.
    pub fn reset(&self) {
        *self.timing.write() = TimingMetrics::default();
        *self.requests.write() = RequestMetrics::default();
        *self.output.write() = OutputMetrics::default();
        *self.diagnostics.write() = DiagnosticMetrics::default();
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("timing", &*self.timing.read())
            .field("requests", &*self.requests.read())
            .field("output", &*self.output.read())
            .finish()
    }
}

/// Snapshot of collected metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Timing metrics.
    pub timing: TimingMetrics,
    /// Trigger discovery metrics.
    pub requests: RequestMetrics,
    /// Generated output metrics.
    pub output: OutputMetrics,
    /// Diagnostic metrics.
    pub diagnostics: DiagnosticMetrics,
}

/// Timing-related metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingMetrics {
    /// When the pass started.
    #[serde(skip)]
    pub start_time: Option<Instant>,
    /// When the pass ended.
    #[serde(skip)]
    pub end_time: Option<Instant>,
    /// Total pass time.
    #[serde(with = "duration_serde")]
    pub total_time: Duration,
    /// Time spent discovering triggers.
    #[serde(with = "duration_serde")]
    pub discovery_time: Duration,
}

/// Trigger discovery metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestMetrics {
    /// Distinct instance requests.
    pub instance: u64,
    /// Distinct static requests.
    pub r#static: u64,
    /// Requests dropped as repeats.
    pub duplicates: u64,
}

/// Generated output metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputMetrics {
    /// Instance wrappers, chain links included.
    pub instance_wrappers: u64,
    /// Static wrappers.
    pub static_wrappers: u64,
    /// Events exposed across all wrappers.
    pub events_wrapped: u64,
    /// Factory methods in the extensions unit.
    pub factory_methods: u64,
    /// Units handed to the host.
    pub source_units: u64,
    /// Bytes of generated text.
    pub total_bytes: u64,
}

/// Diagnostic metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticMetrics {
    /// Informational diagnostics.
    pub info: u64,
    /// Warnings.
    pub warnings: u64,
    /// Errors.
    pub errors: u64,
    /// Count per diagnostic id.
    pub by_id: BTreeMap<String, u64>,
}

/// Custom serde for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_nanos().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u128::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_timing() {
        let collector = MetricsCollector::new();

        collector.record_start();
        std::thread::sleep(Duration::from_millis(5));
        collector.record_end();

        let snapshot = collector.snapshot();
        assert!(snapshot.timing.total_time >= Duration::from_millis(5));
    }

    #[test]
    fn test_metrics_collector_output() {
        let collector = MetricsCollector::new();

        collector.record_request(WrapperMode::Instance);
        collector.record_request(WrapperMode::Static);
        collector.record_duplicate();
        collector.record_wrapper(WrapperMode::Instance, 3);
        collector.record_wrapper(WrapperMode::Instance, 1);
        collector.record_factory();
        collector.record_source(100);
        collector.record_source(50);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.requests.instance, 1);
        assert_eq!(snapshot.requests.r#static, 1);
        assert_eq!(snapshot.requests.duplicates, 1);
        assert_eq!(snapshot.output.instance_wrappers, 2);
        assert_eq!(snapshot.output.events_wrapped, 4);
        assert_eq!(snapshot.output.source_units, 2);
        assert_eq!(snapshot.output.total_bytes, 150);
    }

    #[test]
    fn test_metrics_collector_diagnostics() {
        let collector = MetricsCollector::new();

        collector.record_diagnostic("RXGEN001", Severity::Warning);
        collector.record_diagnostic("RXGEN001", Severity::Warning);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.diagnostics.warnings, 2);
        assert_eq!(snapshot.diagnostics.by_id.get("RXGEN001"), Some(&2));
    }

    #[test]
    fn test_metrics_collector_reset() {
        let collector = MetricsCollector::new();
        collector.record_source(10);

        collector.reset();

        assert_eq!(collector.snapshot().output.source_units, 0);
    }

    #[test]
    fn test_snapshot_serializes_durations_as_nanos() {
        let collector = MetricsCollector::new();
        collector.record_discovery_time(Duration::from_micros(2));

        let json = serde_json::to_value(collector.snapshot()).unwrap();
        assert_eq!(json["timing"]["discovery_time"], 2000);
        assert_eq!(json["requests"]["static"], 0);
    }
}
