//! Debounced value propagation
//!
//! [`Debouncer`] forwards the last value of a burst of updates once no new
//! update has arrived for a fixed quiet interval. Each push restarts the
//! timer; cancellation (explicit or by drop) discards any pending value.
//!
//! ```ignore
//! let debouncer = Debouncer::new(DEFAULT_DEBOUNCE, |query: String| {
//!     println!("search settled on {query}");
//! });
//! debouncer.push("b".to_string());
//! debouncer.push("be".to_string());
//! debouncer.push("bet".to_string()); // only "bet" is delivered, 300ms later
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Quiet interval used for search input
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Delays propagation of rapidly changing values
pub struct Debouncer<T> {
    delay: Duration,
    callback: Callback<T>,
    /// Bumped on every push and cancel; a timer only fires for its own generation
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            callback: Arc::new(callback),
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the quiet interval
    ///
    /// Outside a Tokio runtime there is no timer to wait on, so the value is
    /// delivered immediately.
    pub fn push(&self, value: T) {
        // Generations are bumped under the lock so the newest push owns the live timer.
        let mut pending = self.pending.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime; delivering debounced value immediately");
            drop(pending);
            (self.callback)(value);
            return;
        };

        let deadline = Instant::now() + self.delay;
        let callback = self.callback.clone();
        let current = self.generation.clone();
        *pending = Some(runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if current.load(Ordering::SeqCst) == generation {
                debug!(generation, "Debounced value settled");
                callback(value);
            }
        }));
    }

    /// Drop any pending value; safe to call repeatedly
    pub fn cancel(&self) {
        let mut pending = self.pending.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }

    /// Whether a value is waiting for its quiet interval to elapse
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(pending) = self.pending.get_mut().take() {
            pending.abort();
        }
    }
}
