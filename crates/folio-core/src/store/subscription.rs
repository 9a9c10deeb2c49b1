//! Cancellable subscription handles
//!
//! A [`Subscription`] is held by the consumer; the matching
//! [`SubscriptionGate`] is held by the producer and wraps every delivery.
//! Cancellation and delivery take the same (re-entrant) lock, so once
//! `cancel()` returns no callback can start, and a callback may cancel its
//! own subscription.

use std::cell::Cell;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

type CancelHook = Box<dyn FnOnce() + Send>;

struct Shared {
    active: ReentrantMutex<Cell<bool>>,
    on_cancel: Mutex<Option<CancelHook>>,
}

/// Consumer side of a live subscription
///
/// Cancelling is idempotent. Dropping the handle cancels it.
pub struct Subscription {
    shared: Arc<Shared>,
}

/// Producer side of a live subscription
#[derive(Clone)]
pub struct SubscriptionGate {
    shared: Arc<Shared>,
}

impl Subscription {
    /// Create an active subscription and its gate
    pub fn new() -> (Self, SubscriptionGate) {
        let shared = Arc::new(Shared {
            active: ReentrantMutex::new(Cell::new(true)),
            on_cancel: Mutex::new(None),
        });
        (
            Self {
                shared: shared.clone(),
            },
            SubscriptionGate { shared },
        )
    }

    /// Register a hook run once, on the first cancellation
    ///
    /// If the subscription is already cancelled the hook runs immediately.
    pub fn on_cancel(self, hook: impl FnOnce() + Send + 'static) -> Self {
        if self.is_active() {
            *self.shared.on_cancel.lock() = Some(Box::new(hook));
        } else {
            hook();
        }
        self
    }

    /// Stop deliveries; safe to call any number of times
    pub fn cancel(&self) {
        let was_active = {
            let active = self.shared.active.lock();
            active.replace(false)
        };
        if was_active {
            let hook = self.shared.on_cancel.lock().take();
            if let Some(hook) = hook {
                hook();
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.lock().get()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

impl SubscriptionGate {
    /// Run `deliver` unless the subscription was cancelled
    ///
    /// Returns whether the delivery ran.
    pub fn deliver(&self, deliver: impl FnOnce()) -> bool {
        let active = self.shared.active.lock();
        if !active.get() {
            return false;
        }
        deliver();
        true
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.lock().get()
    }
}
