//! Observable implementation (RxJS-like)

use super::{Callbacks, ConnectableObservable, Emitter, Observer, Subscription};
use crate::error::RxError;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type SubscribeFn<T> = dyn Fn(Emitter<T>) + Send + Sync;

/// Observable - a re-runnable emission recipe
///
/// Observables are cold: every bind runs the recipe again from the start
/// against a fresh [`Emitter`]. Cloning is cheap and shares the recipe.
///
/// # Example
/// ```
/// use ripple::Observable;
///
/// let names = Observable::just(["Bruce", "Ed", "Tony"]).unwrap();
/// names
///     .map(|s| s.len())
///     .subscribe_next(|len| println!("Received => {}", len));
/// ```
pub struct Observable<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T: Send + 'static> Observable<T> {
    /// Create an Observable from a raw recipe.
    ///
    /// The recipe gets the emitter by value and may hand it to another thread.
    /// It is responsible for honoring [`Emitter::is_disposed`].
    pub fn from_fn<F>(recipe: F) -> Self
    where
        F: Fn(Emitter<T>) + Send + Sync + 'static,
    {
        Self {
            subscribe_fn: Arc::new(recipe),
        }
    }

    /// Bind an observer and start emission
    pub fn subscribe_with<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T>,
    {
        let subscription = Subscription::new();
        self.bind(Box::new(observer), subscription.clone());
        subscription
    }

    /// Subscribe with next/error/complete callbacks (RxJS style)
    pub fn subscribe<N, E, C>(&self, next: N, error: E, complete: C) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(RxError) + Send + 'static,
        C: FnMut() + Send + 'static,
    {
        self.subscribe_with(Callbacks::new(next, error, complete))
    }

    /// Subscribe with only next callback (simplified).
    ///
    /// A terminal error is surfaced through [`Subscription::error`].
    pub fn subscribe_next<F>(&self, next: F) -> Subscription
    where
        F: FnMut(T) + Send + 'static,
    {
        self.subscribe_with(Callbacks::on_next(next))
    }

    /// Subscribe with next and error callbacks
    pub fn subscribe_next_error<N, E>(&self, next: N, error: E) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(RxError) + Send + 'static,
    {
        self.subscribe_with(Callbacks::on_next(next).with_error(error))
    }

    /// Turn this cold observable into a hot, connectable one
    pub fn publish(&self) -> ConnectableObservable<T>
    where
        T: Clone,
    {
        ConnectableObservable::new(self.clone())
    }

    /// Run the recipe against `observer`, delivering through `subscription`
    pub(crate) fn bind(&self, observer: Box<dyn Observer<T>>, subscription: Subscription) {
        debug!("Binding observer to subscription {}", subscription.id());
        let emitter = Emitter::new(observer, subscription);
        (self.subscribe_fn)(emitter);
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}
