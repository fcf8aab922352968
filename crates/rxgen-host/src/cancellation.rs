//! Cooperative cancellation for generation passes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A token the host flips to stop a running pass.
///
/// Clone the token to share it across threads. The generator only polls
/// it between types, so a type already in progress runs to completion
/// and is then discarded.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new, untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true if cancellation has been triggered.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
