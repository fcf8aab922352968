//! Observable events during a generation pass.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use rxgen_core::{Diagnostic, Severity, WrapperMode};

/// Events that can be observed during a generation pass.
#[derive(Debug, Clone)]
pub enum PassEvent {
    /// Trigger discovery finished.
    PassStarted {
        /// Distinct instance requests.
        instance_requests: usize,
        /// Distinct static requests.
        static_requests: usize,
    },
    /// A request repeated an earlier one and was dropped.
    RequestDeduplicated {
        /// Qualified name of the requested type.
        type_name: String,
        /// Requested mode.
        mode: WrapperMode,
    },
    /// A wrapper class was built.
    WrapperGenerated {
        /// Qualified name of the wrapped type.
        type_name: String,
        /// Wrapper mode.
        mode: WrapperMode,
        /// Hint name of the unit.
        file_name: String,
        /// Number of events the wrapper exposes.
        events: usize,
    },
    /// A source unit was handed to the host.
    SourceAdded {
        /// Hint name.
        hint_name: String,
        /// Size of the text in bytes.
        bytes: usize,
    },
    /// A diagnostic was reported.
    DiagnosticReported {
        /// The diagnostic.
        diagnostic: Diagnostic,
    },
    /// Processing of one type failed and was skipped.
    TypeFailed {
        /// Qualified name of the type.
        type_name: String,
        /// Failure message.
        message: String,
    },
    /// The host cancelled the pass.
    PassCancelled {
        /// Requests fully processed before cancellation.
        processed: usize,
    },
    /// The pass finished.
    PassCompleted {
        /// Source units added.
        sources: usize,
        /// Diagnostics reported.
        diagnostics: usize,
        /// Total duration.
        duration: Duration,
    },
}

impl PassEvent {
    /// Get the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            PassEvent::PassStarted { .. } => "pass_started",
            PassEvent::RequestDeduplicated { .. } => "request_deduplicated",
            PassEvent::WrapperGenerated { .. } => "wrapper_generated",
            PassEvent::SourceAdded { .. } => "source_added",
            PassEvent::DiagnosticReported { .. } => "diagnostic_reported",
            PassEvent::TypeFailed { .. } => "type_failed",
            PassEvent::PassCancelled { .. } => "pass_cancelled",
            PassEvent::PassCompleted { .. } => "pass_completed",
        }
    }
}

/// Subscriber for pass events.
pub trait EventSubscriber: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &PassEvent);

    /// Filter for event types this subscriber is interested in.
    /// Returns `None` to receive all events.
    fn event_filter(&self) -> Option<Vec<&'static str>> {
        None
    }
}

/// A subscriber that forwards pass events to `tracing`.
#[derive(Debug, Default)]
pub struct LoggingSubscriber;

impl LoggingSubscriber {
    /// Create a new logging subscriber.
    pub fn new() -> Self {
        Self
    }
}

impl EventSubscriber for LoggingSubscriber {
    fn on_event(&self, event: &PassEvent) {
        match event {
            PassEvent::PassStarted {
                instance_requests,
                static_requests,
            } => {
                tracing::info!(
                    event = "pass_started",
                    instance_requests = instance_requests,
                    static_requests = static_requests,
                    "Generation pass started"
                );
            }
            PassEvent::RequestDeduplicated { type_name, mode } => {
                tracing::trace!(
                    event = "request_deduplicated",
                    type_name = %type_name,
                    mode = %mode,
                    "Dropped repeated request"
                );
            }
            PassEvent::WrapperGenerated {
                type_name,
                mode,
                file_name,
                events,
            } => {
                tracing::debug!(
                    event = "wrapper_generated",
                    type_name = %type_name,
                    mode = %mode,
                    file = %file_name,
                    events = events,
                    "Wrapper generated"
                );
            }
            PassEvent::SourceAdded { hint_name, bytes } => {
                tracing::trace!(
                    event = "source_added",
                    hint = %hint_name,
                    bytes = bytes,
                    "Source added"
                );
            }
            PassEvent::DiagnosticReported { diagnostic } => match diagnostic.severity {
                Severity::Info => {
                    tracing::info!(event = "diagnostic", id = %diagnostic.id, "{}", diagnostic.message)
                }
                Severity::Warning => {
                    tracing::warn!(event = "diagnostic", id = %diagnostic.id, "{}", diagnostic.message)
                }
                Severity::Error => {
                    tracing::error!(event = "diagnostic", id = %diagnostic.id, "{}", diagnostic.message)
                }
            },
            PassEvent::TypeFailed { type_name, message } => {
                tracing::warn!(
                    event = "type_failed",
                    type_name = %type_name,
                    message = %message,
                    "Type skipped after failure"
                );
            }
            PassEvent::PassCancelled { processed } => {
                tracing::info!(event = "pass_cancelled", processed = processed, "Pass cancelled");
            }
            PassEvent::PassCompleted {
                sources,
                diagnostics,
                duration,
            } => {
                tracing::info!(
                    event = "pass_completed",
                    sources = sources,
                    diagnostics = diagnostics,
                    duration_ms = duration.as_millis() as u64,
                    "Generation pass completed"
                );
            }
        }
    }
}

/// A subscriber that collects events for later analysis.
pub struct CollectingSubscriber {
    events: RwLock<Vec<(Instant, PassEvent)>>,
    max_events: usize,
}

impl CollectingSubscriber {
    /// Create a new collecting subscriber.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            max_events,
        }
    }

    /// Get collected events.
    pub fn events(&self) -> Vec<(Instant, PassEvent)> {
        self.events.read().clone()
    }

    /// Event type names in the order they arrived.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.read().iter().map(|(_, e)| e.event_type()).collect()
    }

    /// Clear collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Get event count.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventSubscriber for CollectingSubscriber {
    fn on_event(&self, event: &PassEvent) {
        let mut events = self.events.write();
        if events.len() < self.max_events {
            events.push((Instant::now(), event.clone()));
        }
    }
}

/// Event dispatcher that manages subscribers.
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

impl EventDispatcher {
    /// Create a new event dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber.
    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.write().push(subscriber);
    }

    /// Remove all subscribers.
    pub fn clear_subscribers(&self) {
        self.subscribers.write().clear();
    }

    /// Get subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: PassEvent) {
        let subscribers = self.subscribers.read();
        for subscriber in subscribers.iter() {
            if let Some(filter) = subscriber.event_filter() {
                if !filter.contains(&event.event_type()) {
                    continue;
                }
            }
            subscriber.on_event(&event);
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WrappersOnly(CollectingSubscriber);

    impl EventSubscriber for WrappersOnly {
        fn on_event(&self, event: &PassEvent) {
            self.0.on_event(event);
        }

        fn event_filter(&self) -> Option<Vec<&'static str>> {
            Some(vec!["wrapper_generated"])
        }
    }

    fn wrapper_event() -> PassEvent {
        PassEvent::WrapperGenerated {
            type_name: "Sample.Foo".to_string(),
            mode: WrapperMode::Instance,
            file_name: "Foo.cs".to_string(),
            events: 2,
        }
    }

    #[test]
    fn test_pass_event_type() {
        assert_eq!(wrapper_event().event_type(), "wrapper_generated");
        assert_eq!(PassEvent::PassCancelled { processed: 0 }.event_type(), "pass_cancelled");
    }

    #[test]
    fn test_collecting_subscriber_max_events() {
        let subscriber = CollectingSubscriber::new(2);
        for i in 0..5 {
            subscriber.on_event(&PassEvent::SourceAdded {
                hint_name: format!("{}.cs", i),
                bytes: i,
            });
        }
        assert_eq!(subscriber.len(), 2);
    }

    #[test]
    fn test_event_dispatcher_applies_filter() {
        let dispatcher = EventDispatcher::new();
        let all = Arc::new(CollectingSubscriber::new(100));
        let filtered = Arc::new(WrappersOnly(CollectingSubscriber::new(100)));

        dispatcher.subscribe(Arc::clone(&all) as Arc<dyn EventSubscriber>);
        dispatcher.subscribe(Arc::clone(&filtered) as Arc<dyn EventSubscriber>);

        dispatcher.emit(PassEvent::PassStarted {
            instance_requests: 1,
            static_requests: 0,
        });
        dispatcher.emit(wrapper_event());

        assert_eq!(all.event_types(), ["pass_started", "wrapper_generated"]);
        assert_eq!(filtered.0.event_types(), ["wrapper_generated"]);
    }

    #[test]
    fn test_logging_subscriber_handles_every_event() {
        let subscriber = LoggingSubscriber::new();
        subscriber.on_event(&wrapper_event());
        subscriber.on_event(&PassEvent::PassCompleted {
            sources: 1,
            diagnostics: 0,
            duration: Duration::from_millis(3),
        });
    }
}
