//! rxgen Observability
//!
//! This crate provides observability for rxgen generation passes,
//! including:
//!
//! - [`MetricsCollector`]: Counts requests, wrappers, units and diagnostics
//! - [`PassReport`]: Complete pass reports
//! - [`EventDispatcher`]: Observable event system
//!
//! # Event Subscription
//!
//! ```ignore
//! use rxgen_observe::{EventDispatcher, LoggingSubscriber, PassEvent};
//! use std::sync::Arc;
//!
//! let dispatcher = EventDispatcher::new();
//! dispatcher.subscribe(Arc::new(LoggingSubscriber::new()));
//!
//! dispatcher.emit(PassEvent::PassStarted {
//!     instance_requests: 3,
//!     static_requests: 1,
//! });
//! ```
//!
//! # Pass Reports
//!
//! ```ignore
//! let report = generator.run(&model, &mut host)?;
//! println!("{}", report.to_text());
//! ```

pub mod events;
pub mod metrics;
pub mod report;

// Re-export main types
pub use events::{CollectingSubscriber, EventDispatcher, EventSubscriber, LoggingSubscriber, PassEvent};
pub use metrics::{
    DiagnosticMetrics, MetricsCollector, MetricsSnapshot, OutputMetrics, RequestMetrics,
    TimingMetrics,
};
pub use report::{GeneratedUnit, PassId, PassOutcome, PassReport, UnitKind};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::events::{EventDispatcher, EventSubscriber, PassEvent};
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
    pub use crate::report::{PassOutcome, PassReport};
}
