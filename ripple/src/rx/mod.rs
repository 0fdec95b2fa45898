//! RxJS-style reactive programming for Rust
//!
//! Push-based observables: sources, operators, subscriptions, and hot
//! multicast through connectable observables.

pub mod connectable;
pub mod emitter;
pub mod observable;
pub mod observer;
pub mod operators;
pub mod sources;
pub mod subscription;

pub use connectable::{ConnectableObservable, ConnectionState};
pub use emitter::Emitter;
pub use observable::Observable;
pub use observer::{Callbacks, Observer};
pub use subscription::Subscription;
