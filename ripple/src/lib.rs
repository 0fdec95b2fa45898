//! # Ripple
//!
//! A small push-based reactive streams engine.
//!
//! ## Features
//!
//! - **Cold observables**: re-runnable recipes (`just`, `from_iterable`, `range`,
//!   `empty`, `never`, `create`, `interval`)
//! - **Operators**: lazy `map`, `filter`, `take`, `skip` and fallible variants
//! - **Subscriptions**: idempotent disposal that is safe across threads
//! - **Hot multicast**: `publish()` + `connect()` share one run between observers
//! - **Stream bridge**: consume any observable as a `futures::Stream`
//!
//! ## Quick Start
//!
//! ```rust
//! use ripple::Observable;
//!
//! let source = Observable::just(["Bruce", "Ed", "Tony", "Alfred", "Robin"]).unwrap();
//!
//! // Cold: each subscriber gets its own run
//! source
//!     .map(|s| s.len())
//!     .filter(|len| *len <= 4)
//!     .subscribe_next(|len| println!("RECEIVED => {}", len));
//!
//! // Hot: one run shared by every registered observer
//! let hot = source.publish();
//! hot.subscribe_next(|s| println!("Observer 1 => {}", s)).unwrap();
//! hot.subscribe_next(|s| println!("Observer 2 => {}", s)).unwrap();
//! hot.connect().unwrap();
//! ```

pub mod error;
pub mod rx;
pub mod stream;

pub use error::{BoxError, Result, RxError};
pub use rx::{
    Callbacks, ConnectableObservable, ConnectionState, Emitter, Observable, Observer,
    Subscription,
};
pub use stream::ObservableStream;
