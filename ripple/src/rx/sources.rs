//! Source factories
//!
//! Primitive producers. All of them are cold: each bind replays from the start.

use super::emitter::guarded;
use super::{Emitter, Observable};
use crate::error::{BoxError, Result, RxError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

impl<T: Send + 'static> Observable<T> {
    /// Emit the given values in order, then complete.
    ///
    /// Fails with [`RxError::InvalidArgument`] when no values are given; use
    /// [`Observable::empty`] for that.
    pub fn just<I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Clone + Sync,
    {
        let values: Arc<[T]> = values.into_iter().collect();
        if values.is_empty() {
            return Err(RxError::InvalidArgument(
                "just() needs at least one value, use empty() instead".to_string(),
            ));
        }
        Ok(Self::emit_all(values))
    }

    /// Emit every element of a finite sequence in order, then complete
    pub fn from_iterable<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Clone + Sync,
    {
        Self::emit_all(items.into_iter().collect())
    }

    /// Complete immediately without emitting
    pub fn empty() -> Self {
        Self::from_fn(|emitter: Emitter<T>| emitter.complete())
    }

    /// Never emit and never terminate
    pub fn never() -> Self {
        Self::from_fn(|emitter: Emitter<T>| {
            debug!(
                "never() bound to subscription {}",
                emitter.subscription().id()
            );
        })
    }

    /// Deliver `error` immediately
    pub fn error(error: RxError) -> Self {
        Self::from_fn(move |emitter: Emitter<T>| emitter.error(error.clone()))
    }

    /// Create an Observable from an emitter callback.
    ///
    /// The callback runs once per bind. Returning `Err` or panicking delivers
    /// [`RxError::Emission`] to the observer.
    ///
    /// # Example
    /// ```
    /// use ripple::Observable;
    ///
    /// let obs = Observable::create(|emitter| {
    ///     emitter.next("Bruce");
    ///     emitter.next("Ed");
    ///     emitter.complete();
    ///     Ok(())
    /// });
    /// obs.subscribe_next(|s| println!("RECEIVED => {}", s));
    /// ```
    pub fn create<F>(emit: F) -> Self
    where
        F: Fn(&Emitter<T>) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::from_fn(move |emitter: Emitter<T>| match guarded(|| emit(&emitter)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => emitter.error(RxError::emission(err)),
            Err(panic) => emitter.error(panic),
        })
    }

    fn emit_all(values: Arc<[T]>) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_fn(move |emitter: Emitter<T>| {
            for value in values.iter() {
                if emitter.is_disposed() {
                    return;
                }
                emitter.next(value.clone());
            }
            emitter.complete();
        })
    }
}

impl Observable<i32> {
    /// Emit `count` consecutive integers starting at `start`
    pub fn range(start: i32, count: i32) -> Result<Self> {
        if count < 0 {
            return Err(RxError::InvalidArgument(format!(
                "count must be >= 0, got {count}"
            )));
        }
        if count > 0 && i64::from(start) + i64::from(count) - 1 > i64::from(i32::MAX) {
            return Err(RxError::InvalidArgument(format!(
                "range({start}, {count}) overflows i32"
            )));
        }

        Ok(Self::from_fn(move |emitter: Emitter<i32>| {
            for offset in 0..count {
                if emitter.is_disposed() {
                    return;
                }
                emitter.next(start + offset);
            }
            emitter.complete();
        }))
    }
}

impl Observable<u64> {
    /// Emit `0, 1, 2, ...` every `period`, starting one period after bind.
    ///
    /// Ticks are produced on a Tokio task, so binding needs a runtime; without
    /// one the observer receives an emission error. Disposal stops the timer.
    pub fn interval(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(RxError::InvalidArgument(
                "interval period must be non-zero".to_string(),
            ));
        }

        Ok(Self::from_fn(move |emitter: Emitter<u64>| {
            let runtime = match tokio::runtime::Handle::try_current() {
                Ok(runtime) => runtime,
                Err(err) => {
                    emitter.error(RxError::emission_msg(format!(
                        "interval requires a Tokio runtime: {err}"
                    )));
                    return;
                }
            };

            let ticks = emitter.clone();
            let task = runtime.spawn(async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut tick: u64 = 0;
                loop {
                    ticker.tick().await;
                    if ticks.is_disposed() {
                        break;
                    }
                    ticks.next(tick);
                    tick += 1;
                }
            });
            emitter.subscription().add_teardown(move || task.abort());
        }))
    }
}

impl<T: Clone + Send + Sync + 'static> FromIterator<T> for Observable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iterable(iter)
    }
}
