/// A snapshot of the state of a [PacedQueue](crate::PacedQueue).
///
/// Not guaranteed to be consistent under high concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueState {
    pub(crate) capacity: usize,
    pub(crate) len: usize,
    pub(crate) available: usize,
    pub(crate) closed: bool,
}

/// Where a queue is in its lifecycle.
///
/// `Open` → `ClosedPending` → `Drained`, or straight from `Open` to `Drained` if the queue is
/// empty when it is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePhase {
    /// Accepting values.
    Open,
    /// Closed, but some values are still waiting to be popped.
    ClosedPending,
    /// Closed and empty. Nothing more will ever be popped.
    Drained,
}

impl QueueState {
    /// The maximum number of values the queue can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of values waiting to be popped.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no values are waiting to be popped.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of values which can be pushed without waiting.
    ///
    /// Always zero once closed.
    pub fn available(&self) -> usize {
        self.available
    }

    /// Whether the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The lifecycle phase this snapshot was taken in.
    pub fn phase(&self) -> QueuePhase {
        match (self.closed, self.len) {
            (false, _) => QueuePhase::Open,
            (true, 0) => QueuePhase::Drained,
            (true, _) => QueuePhase::ClosedPending,
        }
    }
}
