//! Forwarding consumer handed to producers
//!
//! Every bind wraps the caller's observer in an [`Emitter`]. The emitter is the
//! only path to the observer, so it is where the protocol is enforced: no events
//! after disposal, no events after a terminal event, and no two deliveries on the
//! same pairing at once.

use super::{Observer, Subscription};
use crate::error::{Result, RxError};
use parking_lot::Mutex;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, warn};

/// Emitter handle - pushes events to one bound observer
///
/// Cheap to clone and safe to move to another thread (e.g. a timer task).
pub struct Emitter<T> {
    inner: Arc<EmitterInner<T>>,
}

struct EmitterInner<T> {
    subscription: Subscription,
    terminated: AtomicBool,
    observer: Mutex<Box<dyn Observer<T>>>,
}

enum Terminal {
    Complete,
    Error(RxError),
}

impl<T: 'static> Emitter<T> {
    pub(crate) fn new(observer: Box<dyn Observer<T>>, subscription: Subscription) -> Self {
        Self {
            inner: Arc::new(EmitterInner {
                subscription,
                terminated: AtomicBool::new(false),
                observer: Mutex::new(observer),
            }),
        }
    }

    /// Push a value downstream.
    ///
    /// A panic in the observer ends this pairing only: it is recorded as an
    /// unhandled error and never unwinds into the producer.
    pub fn next(&self, value: T) {
        let subscription = &self.inner.subscription;
        {
            let _gate = subscription.gate();
            if subscription.is_disposed() {
                return;
            }
            if self.inner.terminated.load(Ordering::Acquire) {
                warn!(
                    "Dropped value emitted after terminal event on subscription {}",
                    subscription.id()
                );
                return;
            }

            // The gate is ours, so a held observer lock means we were re-entered
            let Some(mut observer) = self.inner.observer.try_lock() else {
                warn!(
                    "Dropped re-entrant emission on subscription {}",
                    subscription.id()
                );
                return;
            };
            let Err(err) = guarded(|| observer.next(value)) else {
                return;
            };
            self.inner.terminated.store(true, Ordering::Release);
            error!("Observer panicked on subscription {}: {}", subscription.id(), err);
            subscription.record_unhandled(err);
        }

        subscription.release();
    }

    /// Terminate the pairing with an error
    pub fn error(&self, error: RxError) {
        self.terminate(Terminal::Error(error));
    }

    /// Terminate the pairing successfully
    pub fn complete(&self) {
        self.terminate(Terminal::Complete);
    }

    /// True once the pairing was disposed or has terminated.
    ///
    /// Producers check this before each emission and stop when it flips.
    pub fn is_disposed(&self) -> bool {
        self.inner.terminated.load(Ordering::Acquire) || self.inner.subscription.is_disposed()
    }

    /// Subscription of the pairing this emitter feeds
    pub fn subscription(&self) -> &Subscription {
        &self.inner.subscription
    }

    fn terminate(&self, event: Terminal) {
        let subscription = &self.inner.subscription;
        {
            let _gate = subscription.gate();
            if subscription.is_disposed() {
                return;
            }

            let Some(mut observer) = self.inner.observer.try_lock() else {
                warn!(
                    "Dropped re-entrant terminal event on subscription {}",
                    subscription.id()
                );
                return;
            };
            if self.inner.terminated.swap(true, Ordering::AcqRel) {
                if let Terminal::Error(err) = event {
                    warn!(
                        "Dropped error after terminal event on subscription {}: {}",
                        subscription.id(),
                        err
                    );
                }
                return;
            }

            let delivered = match event {
                Terminal::Complete => guarded(|| observer.complete()),
                Terminal::Error(err) if observer.handles_errors() => {
                    guarded(|| observer.error(err))
                }
                Terminal::Error(err) => {
                    error!("Unhandled error on subscription {}: {}", subscription.id(), err);
                    subscription.record_unhandled(err);
                    Ok(())
                }
            };
            if let Err(err) = delivered {
                error!("Observer panicked on subscription {}: {}", subscription.id(), err);
                subscription.record_unhandled(err);
            }
        }

        subscription.release();
    }
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Run a user callback, turning a panic into an emission error
pub(crate) fn guarded<R>(f: impl FnOnce() -> R) -> Result<R> {
    catch_unwind(AssertUnwindSafe(f)).map_err(RxError::from_panic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rx::Callbacks;

    fn recording() -> (Emitter<i32>, Subscription, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (l1, l2, l3) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));
        let observer = Callbacks::new(
            move |v: i32| l1.lock().push(format!("next {v}")),
            move |e| l2.lock().push(format!("error {e}")),
            move || l3.lock().push("complete".to_string()),
        );
        let subscription = Subscription::new();
        let emitter = Emitter::new(Box::new(observer), subscription.clone());
        (emitter, subscription, log)
    }

    #[test]
    fn test_single_terminal_event() {
        let (emitter, _sub, log) = recording();

        emitter.next(1);
        emitter.complete();
        emitter.next(2);
        emitter.error(RxError::emission_msg("late"));
        emitter.complete();

        assert_eq!(*log.lock(), vec!["next 1", "complete"]);
        assert!(emitter.is_disposed());
    }

    #[test]
    fn test_disposal_suppresses_terminal() {
        let (emitter, sub, log) = recording();

        emitter.next(1);
        sub.dispose();
        emitter.next(2);
        emitter.complete();

        assert_eq!(*log.lock(), vec!["next 1"]);
    }

    #[test]
    fn test_unhandled_error_is_recorded() {
        let subscription = Subscription::new();
        let emitter = Emitter::new(Box::new(Callbacks::on_next(|_: i32| {})), subscription.clone());

        emitter.error(RxError::emission_msg("nobody listens"));

        let err = subscription.error().expect("error must be surfaced");
        assert_eq!(err.to_string(), "Emission error: nobody listens");
    }

    #[test]
    fn test_reentrant_emission_dropped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let slot: Arc<Mutex<Option<Emitter<i32>>>> = Arc::new(Mutex::new(None));

        let l = Arc::clone(&log);
        let s = Arc::clone(&slot);
        let observer = Callbacks::on_next(move |v: i32| {
            l.lock().push(v);
            if let Some(me) = s.lock().clone() {
                me.next(v * 10);
            }
        });
        let emitter = Emitter::new(Box::new(observer), Subscription::new());
        *slot.lock() = Some(emitter.clone());

        emitter.next(1);
        emitter.next(2);

        assert_eq!(*log.lock(), vec![1, 2]);
    }

    #[test]
    fn test_terminal_runs_teardowns() {
        let (emitter, sub, _log) = recording();
        let released = Arc::new(AtomicBool::new(false));
        let r = Arc::clone(&released);
        sub.add_teardown(move || r.store(true, Ordering::SeqCst));

        emitter.complete();

        assert!(released.load(Ordering::SeqCst));
        assert!(!sub.is_disposed());
    }

    #[test]
    fn test_observer_panic_ends_only_its_pairing() {
        let subscription = Subscription::new();
        let released = Arc::new(AtomicBool::new(false));
        let r = Arc::clone(&released);
        subscription.add_teardown(move || r.store(true, Ordering::SeqCst));

        let observer = Callbacks::on_next(|v: i32| {
            if v == 2 {
                panic!("cannot take {v}");
            }
        });
        let emitter = Emitter::new(Box::new(observer), subscription.clone());

        emitter.next(1);
        emitter.next(2);
        emitter.next(3);
        emitter.complete();

        assert!(emitter.is_disposed());
        assert!(released.load(Ordering::SeqCst));
        let err = subscription.error().expect("panic must be surfaced");
        assert!(err.to_string().contains("cannot take 2"));
    }

    #[test]
    fn test_panic_in_complete_is_recorded() {
        let subscription = Subscription::new();
        let observer = Callbacks::on_next(|_: i32| {}).with_complete(|| panic!("done badly"));
        let emitter = Emitter::new(Box::new(observer), subscription.clone());

        emitter.complete();

        let err = subscription.error().expect("panic must be surfaced");
        assert!(err.to_string().contains("done badly"));
    }

    #[test]
    fn test_guarded_catches_panic() {
        let ok = guarded(|| 7);
        assert_eq!(ok.unwrap(), 7);

        let err = guarded(|| -> i32 { panic!("bad input") }).unwrap_err();
        assert!(err.to_string().contains("bad input"));
    }
}
