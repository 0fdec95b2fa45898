//! RxJS-style operators
//!
//! Every operator is lazy: binding the derived observable binds a fresh
//! internal observer to the upstream. A failing callback (an `Err` from the
//! `try_` variants, or a panic) disposes the upstream and terminates the
//! downstream with [`RxError::Emission`].

use super::emitter::guarded;
use super::{Emitter, Observable, Observer, Subscription};
use crate::error::{BoxError, Result, RxError};
use std::marker::PhantomData;
use std::sync::Arc;

/// Outcome of feeding one upstream value through an operator
enum Step<R> {
    Emit(R),
    Skip,
    /// Emit, then complete and release the upstream
    Last(R),
}

/// Internal observer bridging an upstream pairing to a downstream emitter
struct StepObserver<T, R, S> {
    step: S,
    downstream: Emitter<R>,
    upstream: Subscription,
    _input: PhantomData<fn(T)>,
}

impl<T, R, S> StepObserver<T, R, S> {
    fn new(downstream: Emitter<R>, upstream: Subscription, step: S) -> Self {
        Self {
            step,
            downstream,
            upstream,
            _input: PhantomData,
        }
    }
}

impl<T, R, S> Observer<T> for StepObserver<T, R, S>
where
    T: 'static,
    R: Send + 'static,
    S: FnMut(T) -> Result<Step<R>> + Send + 'static,
{
    fn next(&mut self, value: T) {
        if self.downstream.is_disposed() {
            self.upstream.dispose();
            return;
        }

        match (self.step)(value) {
            Ok(Step::Emit(out)) => self.downstream.next(out),
            Ok(Step::Skip) => {}
            Ok(Step::Last(out)) => {
                self.downstream.next(out);
                self.upstream.dispose();
                self.downstream.complete();
            }
            Err(err) => {
                self.upstream.dispose();
                self.downstream.error(err);
            }
        }
    }

    fn error(&mut self, error: RxError) {
        self.downstream.error(error);
    }

    fn complete(&mut self) {
        self.downstream.complete();
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Derive an observable whose binds feed a per-bind step function
    fn lift<R, M, S>(&self, make_step: M) -> Observable<R>
    where
        R: Send + 'static,
        M: Fn() -> S + Send + Sync + 'static,
        S: FnMut(T) -> Result<Step<R>> + Send + 'static,
    {
        let upstream = self.clone();
        Observable::from_fn(move |downstream: Emitter<R>| {
            let upstream_sub = Subscription::new();
            downstream.subscription().add(upstream_sub.clone());
            let observer = StepObserver::new(downstream, upstream_sub.clone(), make_step());
            upstream.bind(Box::new(observer), upstream_sub);
        })
    }

    /// Map operator - transform values
    ///
    /// # Example
    /// ```
    /// use ripple::Observable;
    ///
    /// let lengths = Observable::just(["Bruce", "Ed"]).unwrap().map(|s| s.len());
    /// lengths.subscribe_next(|n| println!("{}", n));
    /// ```
    pub fn map<R, F>(&self, f: F) -> Observable<R>
    where
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.lift(move || {
            let f = Arc::clone(&f);
            move |value: T| -> Result<Step<R>> { guarded(|| f(value)).map(Step::Emit) }
        })
    }

    /// Map with a fallible function; `Err` terminates the downstream
    pub fn try_map<R, F>(&self, f: F) -> Observable<R>
    where
        R: Send + 'static,
        F: Fn(T) -> std::result::Result<R, BoxError> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.lift(move || {
            let f = Arc::clone(&f);
            move |value: T| -> Result<Step<R>> {
                match guarded(|| f(value))? {
                    Ok(out) => Ok(Step::Emit(out)),
                    Err(err) => Err(RxError::emission(err)),
                }
            }
        })
    }

    /// Filter operator - forward only values matching the predicate
    pub fn filter<P>(&self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        self.lift(move || {
            let predicate = Arc::clone(&predicate);
            move |value: T| -> Result<Step<T>> {
                let keep = guarded(|| predicate(&value))?;
                Ok(if keep { Step::Emit(value) } else { Step::Skip })
            }
        })
    }

    /// Filter with a fallible predicate; `Err` terminates the downstream
    pub fn try_filter<P>(&self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> std::result::Result<bool, BoxError> + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        self.lift(move || {
            let predicate = Arc::clone(&predicate);
            move |value: T| -> Result<Step<T>> {
                match guarded(|| predicate(&value))? {
                    Ok(true) => Ok(Step::Emit(value)),
                    Ok(false) => Ok(Step::Skip),
                    Err(err) => Err(RxError::emission(err)),
                }
            }
        })
    }

    /// Take operator - take first N values, then complete
    pub fn take(&self, n: usize) -> Observable<T> {
        if n == 0 {
            return Observable::empty();
        }
        self.lift(move || {
            let mut remaining = n;
            move |value: T| -> Result<Step<T>> {
                remaining -= 1;
                Ok(if remaining == 0 {
                    Step::Last(value)
                } else {
                    Step::Emit(value)
                })
            }
        })
    }

    /// Skip operator - skip first N values
    pub fn skip(&self, n: usize) -> Observable<T> {
        self.lift(move || {
            let mut skipped = 0;
            move |value: T| -> Result<Step<T>> {
                if skipped < n {
                    skipped += 1;
                    Ok(Step::Skip)
                } else {
                    Ok(Step::Emit(value))
                }
            }
        })
    }
}
