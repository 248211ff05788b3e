//! Building blocks for debounced background saves.
//!
//! [`SaveDebouncer`] coalesces a burst of edits into one write after a quiet
//! period. [`SaveSequencer`] guards against out-of-order completions: two
//! saves may be in flight at once, and the slower response must not clobber
//! state from the newer one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Runs a save after a quiet period, restarting the countdown on every new
/// `schedule` call. Only one save is pending at a time; scheduling replaces
/// whatever was waiting.
#[derive(Debug)]
pub struct SaveDebouncer {
    quiet: Duration,
    pending: Option<JoinHandle<()>>,
}

impl SaveDebouncer {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Schedules `save` to run once `quiet` elapses without another call.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, save: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        // Anchor the deadline at the schedule call, not at the spawned
        // task's first poll, so the quiet period is measured from here.
        let deadline = Instant::now() + self.quiet;
        self.pending = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            save.await;
        }));
    }

    /// Drops the pending save, if any. A save already past its timer keeps
    /// running; cancellation only stops ones still waiting.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// True while a scheduled save has neither fired nor been cancelled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for SaveDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Monotonic tickets for save requests.
///
/// `begin` stamps a request at send time; `try_apply` at response time tells
/// the caller whether this response is still the newest one seen. Responses
/// for superseded tickets are discarded by the caller.
#[derive(Debug, Default)]
pub struct SaveSequencer {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl SaveSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps the next outgoing save.
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True if `ticket` is newer than every response applied so far; marks
    /// it applied when so.
    pub fn try_apply(&self, ticket: u64) -> bool {
        self.applied.fetch_max(ticket, Ordering::SeqCst) < ticket
    }
}
