//! Errors returned when a [PacedQueue](crate::PacedQueue) refuses a value.

use thiserror::Error;

/// The queue has already been closed.
///
/// Closing is permanent, so this is never worth retrying. Producers should stop once they see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("paced queue already closed")]
pub struct ClosedError;

/// Returned by [try_push](crate::PacedQueue::try_push). The rejected value is handed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TryPushError<T> {
    /// Every slot is in use.
    #[error("paced queue is full")]
    Full(T),
    /// The queue has been closed.
    #[error("paced queue already closed")]
    Closed(T),
}

/// Returned by [push_timeout](crate::PacedQueue::push_timeout). The rejected value is handed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushTimeoutError<T> {
    /// No slot became free before the timeout.
    #[error("timed out waiting for space in paced queue")]
    Elapsed(T),
    /// The queue has been closed.
    #[error("paced queue already closed")]
    Closed(T),
}

impl<T> TryPushError<T> {
    /// Recover the value which could not be pushed.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) | Self::Closed(value) => value,
        }
    }

    /// Whether the push failed because the queue is closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

impl<T> PushTimeoutError<T> {
    /// Recover the value which could not be pushed.
    pub fn into_inner(self) -> T {
        match self {
            Self::Elapsed(value) | Self::Closed(value) => value,
        }
    }

    /// Whether the push failed because the queue is closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}
