//! Shared helpers for integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use ripple::{Callbacks, RxError};
use std::sync::Arc;

/// Event seen by a recording observer
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    Next(T),
    Error(String),
    Complete,
}

/// Observer that records every event it receives
pub struct Recorder<T> {
    events: Arc<Mutex<Vec<Event<T>>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn observer(&self) -> Callbacks<T> {
        let (n, e, c) = (
            Arc::clone(&self.events),
            Arc::clone(&self.events),
            Arc::clone(&self.events),
        );
        Callbacks::new(
            move |v| n.lock().push(Event::Next(v)),
            move |err: RxError| e.lock().push(Event::Error(err.to_string())),
            move || c.lock().push(Event::Complete),
        )
    }

    pub fn events(&self) -> Vec<Event<T>> {
        self.events.lock().clone()
    }

    pub fn values(&self) -> Vec<T> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Next(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn terminal_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| !matches!(event, Event::Next(_)))
            .count()
    }
}

/// Route engine logs to the test output (once per test binary)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
