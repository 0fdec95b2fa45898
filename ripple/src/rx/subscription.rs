//! Disposal handle

use crate::error::RxError;
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use uuid::Uuid;

type Teardown = Box<dyn FnOnce() + Send>;

/// Subscription handle returned by every bind
///
/// Cloning shares the handle. `dispose` is idempotent and only affects the
/// pairing this handle was created for.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

struct SubscriptionInner {
    id: Uuid,
    disposed: AtomicBool,
    /// Held for the duration of each delivery on this pairing
    gate: ReentrantMutex<()>,
    teardowns: Mutex<Vec<Teardown>>,
    unhandled: Mutex<Option<RxError>>,
}

impl Subscription {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SubscriptionInner {
                id: Uuid::new_v4(),
                disposed: AtomicBool::new(false),
                gate: ReentrantMutex::new(()),
                teardowns: Mutex::new(Vec::new()),
                unhandled: Mutex::new(None),
            }),
        }
    }

    /// Unique id of this pairing
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Stop delivery to this pairing.
    ///
    /// Once this returns, no further event reaches the observer. A delivery
    /// running on another thread is allowed to finish first.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Wait out an in-flight delivery (no-op when called from inside one)
        drop(self.inner.gate.lock());

        let teardowns = std::mem::take(&mut *self.inner.teardowns.lock());
        debug!(
            "Subscription {} disposed ({} teardowns)",
            self.inner.id,
            teardowns.len()
        );
        for teardown in teardowns {
            teardown();
        }
    }

    /// Check if the subscription has been disposed
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Error delivered to an observer that had no error handler
    pub fn error(&self) -> Option<RxError> {
        self.inner.unhandled.lock().clone()
    }

    /// Register cleanup to run on disposal.
    ///
    /// Runs immediately if the subscription is already disposed.
    pub fn add_teardown<F>(&self, teardown: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut teardowns = self.inner.teardowns.lock();
            if !self.is_disposed() {
                teardowns.push(Box::new(teardown));
                return;
            }
        }
        teardown();
    }

    /// Dispose `other` whenever this subscription is disposed
    pub fn add(&self, other: Subscription) {
        self.add_teardown(move || other.dispose());
    }

    pub(crate) fn gate(&self) -> ReentrantMutexGuard<'_, ()> {
        self.inner.gate.lock()
    }

    pub(crate) fn record_unhandled(&self, error: RxError) {
        let mut slot = self.inner.unhandled.lock();
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    /// Run registered teardowns without marking the handle disposed.
    ///
    /// Called once a pairing terminated on its own, so upstream resources are
    /// freed while `is_disposed` keeps reporting caller intent only.
    pub(crate) fn release(&self) {
        let teardowns = std::mem::take(&mut *self.inner.teardowns.lock());
        for teardown in teardowns {
            teardown();
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.inner.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
