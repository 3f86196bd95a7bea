//! Debounced search scheduling.

use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;
use tracing::debug;

/// Default pause after the last keystroke before a search runs.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Delays a search until input has paused.
///
/// Each submission cancels the pending one, so only the most recent query
/// runs once `delay` has elapsed without further input.
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet period applied to submissions.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `action` with the trimmed query, replacing whatever was pending.
    ///
    /// A blank query only cancels; returns whether an action was scheduled.
    /// Must be called from within a tokio runtime.
    pub fn submit<F, Fut>(&mut self, query: &str, action: F) -> bool
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let query = query.trim();
        if query.is_empty() {
            return false;
        }

        let query = query.to_string();
        let delay = self.delay;
        debug!(%query, delay_ms = delay.as_millis() as u64, "Scheduling search");
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action(query).await;
        }));
        true
    }

    /// Drop the pending search, including one already in flight.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a scheduled search has not yet finished.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
