//! Error types for Ripple

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error returned by fallible user callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for Ripple operations
pub type Result<T> = std::result::Result<T, RxError>;

/// Ripple error types
///
/// Construction-time problems (`InvalidArgument`, `InvalidState`) are returned to
/// the caller. `Emission` is only ever delivered through an observer's error
/// channel.
#[derive(Error, Debug, Clone)]
pub enum RxError {
    /// Invalid factory or operator argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Illegal lifecycle transition
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Failure raised inside a create function, mapper or predicate
    #[error("Emission error: {0}")]
    Emission(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl RxError {
    /// Wrap a user error as an emission error
    pub fn emission(error: impl Into<BoxError>) -> Self {
        Self::Emission(Arc::from(error.into()))
    }

    /// Build an emission error from a plain message
    pub fn emission_msg(message: impl fmt::Display) -> Self {
        Self::emission(message.to_string())
    }

    /// Convert a caught panic payload into an emission error
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "callback panicked".to_string()
        };
        Self::emission_msg(format!("panic: {message}"))
    }

    /// Whether this error came from inside an emission
    pub fn is_emission(&self) -> bool {
        matches!(self, Self::Emission(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RxError::InvalidArgument("count must be >= 0".to_string());
        assert_eq!(err.to_string(), "Invalid argument: count must be >= 0");

        let err = RxError::InvalidState("already connected".to_string());
        assert_eq!(err.to_string(), "Invalid state: already connected");

        let err = RxError::emission_msg("boom");
        assert_eq!(err.to_string(), "Emission error: boom");
        assert!(err.is_emission());
    }

    #[test]
    fn test_from_panic_payloads() {
        let err = RxError::from_panic(Box::new("static str"));
        assert_eq!(err.to_string(), "Emission error: panic: static str");

        let err = RxError::from_panic(Box::new(String::from("owned")));
        assert_eq!(err.to_string(), "Emission error: panic: owned");

        let err = RxError::from_panic(Box::new(42_u8));
        assert_eq!(err.to_string(), "Emission error: panic: callback panicked");
    }

    #[test]
    fn test_clone_shares_source() {
        let err = RxError::emission(std::io::Error::other("disk"));
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
