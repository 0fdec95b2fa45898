//! Observer protocol

use crate::error::RxError;

/// Observer trait - receives the three emission events
///
/// A producer drives an observer through zero or more `next` calls followed by
/// exactly one of `error` or `complete`.
pub trait Observer<T>: Send + 'static {
    fn next(&mut self, value: T);
    fn error(&mut self, error: RxError);
    fn complete(&mut self);

    /// Whether this observer handles errors itself.
    ///
    /// When `false`, the engine surfaces terminal errors on the subscription
    /// instead of treating the `error` call as delivered.
    fn handles_errors(&self) -> bool {
        true
    }
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnMut(RxError) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;

/// Observer built from up to three callbacks
///
/// Only `next` is mandatory; missing `complete` is a no-op and a missing
/// `error` leaves errors to be surfaced by the subscription.
pub struct Callbacks<T> {
    next: NextFn<T>,
    error: Option<ErrorFn>,
    complete: Option<CompleteFn>,
}

impl<T> Callbacks<T> {
    /// Observer with only a `next` handler
    pub fn on_next<N>(next: N) -> Self
    where
        N: FnMut(T) + Send + 'static,
    {
        Self {
            next: Box::new(next),
            error: None,
            complete: None,
        }
    }

    /// Observer with all three handlers
    pub fn new<N, E, C>(next: N, error: E, complete: C) -> Self
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(RxError) + Send + 'static,
        C: FnMut() + Send + 'static,
    {
        Self {
            next: Box::new(next),
            error: Some(Box::new(error)),
            complete: Some(Box::new(complete)),
        }
    }

    /// Set the error handler
    pub fn with_error<E>(mut self, error: E) -> Self
    where
        E: FnMut(RxError) + Send + 'static,
    {
        self.error = Some(Box::new(error));
        self
    }

    /// Set the completion handler
    pub fn with_complete<C>(mut self, complete: C) -> Self
    where
        C: FnMut() + Send + 'static,
    {
        self.complete = Some(Box::new(complete));
        self
    }
}

impl<T: 'static> Observer<T> for Callbacks<T> {
    fn next(&mut self, value: T) {
        (self.next)(value);
    }

    fn error(&mut self, error: RxError) {
        if let Some(on_error) = &mut self.error {
            on_error(error);
        }
    }

    fn complete(&mut self) {
        if let Some(on_complete) = &mut self.complete {
            on_complete();
        }
    }

    fn handles_errors(&self) -> bool {
        self.error.is_some()
    }
}

impl<T, O> Observer<T> for Box<O>
where
    O: Observer<T> + ?Sized,
{
    fn next(&mut self, value: T) {
        (**self).next(value);
    }

    fn error(&mut self, error: RxError) {
        (**self).error(error);
    }

    fn complete(&mut self) {
        (**self).complete();
    }

    fn handles_errors(&self) -> bool {
        (**self).handles_errors()
    }
}
