//! Connectable (hot) observables
//!
//! A [`ConnectableObservable`] wraps one cold source and shares a single run of
//! it between every registered observer. Nothing is emitted until
//! [`ConnectableObservable::connect`]; observers registered later only see what
//! is emitted after their registration.

use super::{Callbacks, Emitter, Observable, Observer, Subscription};
use crate::error::{Result, RxError};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;
use uuid::Uuid;

/// Lifecycle of a connectable observable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accepting registrations, source not started
    Unconnected,
    /// Source running, values fanned out to members
    Connected,
    /// Terminal: source finished or was disconnected
    Disposed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unconnected => "unconnected",
            Self::Connected => "connected",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Hot observable with an explicit connect/disconnect lifecycle
///
/// # Example
/// ```
/// use ripple::Observable;
///
/// let source = Observable::just(["Bruce", "Ed", "Tony"]).unwrap();
/// let hot = source.publish();
/// hot.subscribe_next(|s| println!("Observer 1 => {}", s)).unwrap();
/// hot.subscribe_next(|s| println!("Observer 2 => {}", s)).unwrap();
/// hot.connect().unwrap();
/// ```
pub struct ConnectableObservable<T> {
    inner: Arc<ConnectableInner<T>>,
}

struct ConnectableInner<T> {
    source: Observable<T>,
    state: Mutex<ConnectionState>,
    /// Members in registration order
    registry: RwLock<Vec<Registration<T>>>,
    connection: Mutex<Option<Subscription>>,
}

struct Registration<T> {
    id: Uuid,
    emitter: Emitter<T>,
}

impl<T: Clone + Send + 'static> ConnectableObservable<T> {
    pub(crate) fn new(source: Observable<T>) -> Self {
        Self {
            inner: Arc::new(ConnectableInner {
                source,
                state: Mutex::new(ConnectionState::Unconnected),
                registry: RwLock::new(Vec::new()),
                connection: Mutex::new(None),
            }),
        }
    }

    /// Register an observer.
    ///
    /// Legal while unconnected or connected. The returned subscription removes
    /// only this registration; registering the same observer twice creates
    /// two independent members.
    pub fn register<O>(&self, observer: O) -> Result<Subscription>
    where
        O: Observer<T>,
    {
        let subscription = Subscription::new();
        self.attach(Emitter::new(Box::new(observer), subscription.clone()))?;
        Ok(subscription)
    }

    /// Register with only a next callback
    pub fn subscribe_next<F>(&self, next: F) -> Result<Subscription>
    where
        F: FnMut(T) + Send + 'static,
    {
        self.register(Callbacks::on_next(next))
    }

    /// Register with next/error/complete callbacks
    pub fn subscribe<N, E, C>(&self, next: N, error: E, complete: C) -> Result<Subscription>
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(RxError) + Send + 'static,
        C: FnMut() + Send + 'static,
    {
        self.register(Callbacks::new(next, error, complete))
    }

    /// Start the shared run of the source.
    ///
    /// Only legal once, from the unconnected state. The returned subscription
    /// is the connection itself; disposing it is the same as [`disconnect`].
    ///
    /// [`disconnect`]: ConnectableObservable::disconnect
    pub fn connect(&self) -> Result<Subscription> {
        {
            let mut state = self.inner.state.lock();
            if *state != ConnectionState::Unconnected {
                return Err(RxError::InvalidState(format!(
                    "connect() called on a {} connectable observable",
                    *state
                )));
            }
            *state = ConnectionState::Connected;
        }

        let connection = Subscription::new();
        *self.inner.connection.lock() = Some(connection.clone());

        let weak: Weak<ConnectableInner<T>> = Arc::downgrade(&self.inner);
        connection.add_teardown(move || {
            if let Some(inner) = weak.upgrade() {
                inner.shut_down();
            }
        });

        debug!(
            "Connecting {} registered observers (connection {})",
            self.subscriber_count(),
            connection.id()
        );

        // The source may run to completion right here, so no lock is held
        let fan_out = FanOut {
            inner: Arc::clone(&self.inner),
        };
        self.inner.source.bind(Box::new(fan_out), connection.clone());
        Ok(connection)
    }

    /// Stop the shared run and move to [`ConnectionState::Disposed`].
    ///
    /// Remaining members are dropped without a terminal event.
    pub fn disconnect(&self) {
        let connection = self.inner.connection.lock().take();
        match connection {
            Some(connection) => connection.dispose(),
            None => self.inner.shut_down(),
        }
    }

    /// Producer view: binding it registers instead of starting emission.
    ///
    /// Binding after disposal delivers [`RxError::InvalidState`] to that observer.
    pub fn as_observable(&self) -> Observable<T> {
        let this = self.clone();
        Observable::from_fn(move |emitter: Emitter<T>| {
            if let Err(err) = this.attach(emitter.clone()) {
                emitter.error(err);
            }
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.lock()
    }

    /// Number of live registrations
    pub fn subscriber_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    fn attach(&self, emitter: Emitter<T>) -> Result<()> {
        let id = emitter.subscription().id();
        {
            // State first, registry second: a terminal drain cannot miss us
            let state = self.inner.state.lock();
            if *state == ConnectionState::Disposed {
                return Err(RxError::InvalidState(
                    "cannot register on a disposed connectable observable".to_string(),
                ));
            }
            self.inner.registry.write().push(Registration {
                id,
                emitter: emitter.clone(),
            });
            debug!("Registered observer {} ({} state)", id, *state);
        }

        let weak: Weak<ConnectableInner<T>> = Arc::downgrade(&self.inner);
        emitter.subscription().add_teardown(move || {
            if let Some(inner) = weak.upgrade() {
                inner.registry.write().retain(|member| member.id != id);
                debug!("Observer {} removed from registry", id);
            }
        });
        Ok(())
    }
}

impl<T> ConnectableInner<T> {
    /// Members at this instant, in registration order
    fn snapshot(&self) -> Vec<Emitter<T>> {
        self.registry
            .read()
            .iter()
            .map(|member| member.emitter.clone())
            .collect()
    }

    /// Move to `Disposed` and hand back every member
    fn drain(&self) -> Vec<Emitter<T>> {
        let mut state = self.state.lock();
        *state = ConnectionState::Disposed;
        std::mem::take(&mut *self.registry.write())
            .into_iter()
            .map(|member| member.emitter)
            .collect()
    }

    fn shut_down(&self) {
        let dropped = self.drain().len();
        debug!("Connectable observable disposed, {} members dropped", dropped);
    }
}

/// Upstream observer that forwards each event to every member
struct FanOut<T> {
    inner: Arc<ConnectableInner<T>>,
}

impl<T: Clone + Send + 'static> FanOut<T> {
    /// Deliver a terminal event to the current members, then move to `Disposed`.
    ///
    /// Members registered from inside a terminal callback are caught by the
    /// final drain and still get the event.
    fn finish(&self, deliver: impl Fn(&Emitter<T>)) {
        for member in self.inner.snapshot() {
            deliver(&member);
        }
        for member in self.inner.drain() {
            deliver(&member);
        }
    }
}

impl<T: Clone + Send + 'static> Observer<T> for FanOut<T> {
    fn next(&mut self, value: T) {
        let members = self.inner.snapshot();
        if let Some((last, rest)) = members.split_last() {
            for member in rest {
                member.next(value.clone());
            }
            last.next(value);
        }
    }

    fn error(&mut self, error: RxError) {
        self.finish(|member| member.error(error.clone()));
    }

    fn complete(&mut self) {
        self.finish(|member| member.complete());
    }
}

impl<T> Clone for ConnectableObservable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ConnectableObservable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectableObservable")
            .field("state", &*self.inner.state.lock())
            .field("members", &self.inner.registry.read().len())
            .finish()
    }
}
