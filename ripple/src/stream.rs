//! Stream bridge
//!
//! Lets async code consume an observable with `StreamExt` instead of callbacks.

use crate::Observable;
use crate::error::{Result, RxError};
use crate::rx::Subscription;
use futures::Stream;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

type SenderSlot<T> = Arc<Mutex<Option<mpsc::UnboundedSender<Result<T>>>>>;

/// Stream of the events of one pairing
///
/// Yields `Ok(value)` per emission, `Err` once on error, and ends after
/// completion or error. Dropping the stream disposes the pairing.
pub struct ObservableStream<T> {
    receiver: mpsc::UnboundedReceiver<Result<T>>,
    subscription: Subscription,
    // Keeps the channel open for sources that never terminate
    _sender: SenderSlot<T>,
}

impl<T> ObservableStream<T> {
    /// Subscription backing this stream
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

impl<T> Stream for ObservableStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl<T> Drop for ObservableStream<T> {
    fn drop(&mut self) {
        // Automatically dispose when the stream is dropped
        self.subscription.dispose();
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Bind a new pairing and expose it as a [`Stream`]
    ///
    /// # Example
    /// ```
    /// use futures::StreamExt;
    /// use ripple::Observable;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let mut stream = Observable::range(1, 3).unwrap().to_stream();
    /// while let Some(Ok(value)) = stream.next().await {
    ///     println!("Next: {}", value);
    /// }
    /// # }
    /// ```
    pub fn to_stream(&self) -> ObservableStream<T> {
        let (tx, receiver) = mpsc::unbounded_channel();
        let slot: SenderSlot<T> = Arc::new(Mutex::new(Some(tx)));

        let (on_next, on_error, on_complete) =
            (Arc::clone(&slot), Arc::clone(&slot), Arc::clone(&slot));
        let subscription = self.subscribe(
            move |value| {
                if let Some(tx) = on_next.lock().as_ref() {
                    let _ = tx.send(Ok(value));
                }
            },
            move |err: RxError| {
                if let Some(tx) = on_error.lock().take() {
                    let _ = tx.send(Err(err));
                }
            },
            move || {
                on_complete.lock().take();
            },
        );

        ObservableStream {
            receiver,
            subscription,
            _sender: slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stream_collects_values() {
        let values: Vec<i32> = Observable::range(1, 4)
            .unwrap()
            .to_stream()
            .map(|item| item.unwrap())
            .collect()
            .await;
        assert_eq!(values, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_stream_yields_error_then_ends() {
        let obs = Observable::create(|emitter| {
            emitter.next(1);
            Err("broken pipe".into())
        });
        let items: Vec<Result<i32>> = obs.to_stream().collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(*items[0].as_ref().unwrap(), 1);
        assert!(items[1].as_ref().unwrap_err().is_emission());
    }

    #[tokio::test]
    async fn test_never_stays_pending() {
        let mut stream = Observable::<i32>::never().to_stream();
        let next = tokio::time::timeout(Duration::from_millis(30), stream.next()).await;
        assert!(next.is_err(), "never() must not end the stream");
    }

    #[tokio::test]
    async fn test_drop_disposes_timer() {
        let stream = Observable::interval(Duration::from_millis(10))
            .unwrap()
            .to_stream();
        let subscription = stream.subscription().clone();
        let first: Vec<_> = stream.take(2).collect().await;
        assert_eq!(first.len(), 2);
        assert!(subscription.is_disposed());
    }
}
