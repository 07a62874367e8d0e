//! A bounded FIFO queue which paces the release of values to consumers.

#![deny(missing_docs)]

#[cfg(doctest)]
use doc_comment::doctest;
#[cfg(doctest)]
doctest!("../README.md");

mod error;
mod queue;

pub use error::{ClosedError, PushTimeoutError, TryPushError};
pub use queue::{PacedQueue, QueuePhase, QueueState, DEFAULT_CAPACITY};
