use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    sync::{Notify, Semaphore, SemaphorePermit, TryAcquireError},
    time::{self, error::Elapsed},
};
use tracing::{debug, trace};

use crate::error::{ClosedError, PushTimeoutError, TryPushError};

use gate::PacingGate;
pub use state::{QueuePhase, QueueState};

mod gate;
mod state;

/// The capacity used by [PacedQueue::new].
pub const DEFAULT_CAPACITY: usize = 1;

/// A bounded FIFO queue which releases values no faster than a fixed interval.
///
/// Producers [push](PacedQueue::push) values, waiting while the queue is full. Consumers
/// [pop](PacedQueue::pop) them in the order they were pushed. Across all consumers combined,
/// two pops never return less than `interval` apart.
///
/// Closing the queue stops any more values from being pushed. Values already in the queue can
/// still be popped, after which every pop reports that there is nothing left.
///
/// Share between tasks with an [Arc](std::sync::Arc).
#[derive(Debug)]
pub struct PacedQueue<T> {
    capacity: usize,
    buffer: Mutex<Buffer<T>>,

    /// One permit per free slot in the buffer. Closed along with the queue.
    slots: Semaphore,
    /// Wakes consumers when a value is pushed or the queue is closed.
    ready: Notify,

    gate: PacingGate,
}

#[derive(Debug)]
struct Buffer<T> {
    values: VecDeque<T>,
    closed: bool,
}

impl<T> PacedQueue<T> {
    /// Create a queue holding up to [DEFAULT_CAPACITY] values, releasing at most one value per
    /// `interval`.
    pub fn new(interval: Duration) -> Self {
        Self::with_capacity(interval, DEFAULT_CAPACITY)
    }

    /// Create a queue holding up to `capacity` values, releasing at most one value per
    /// `interval`.
    ///
    /// # Panics
    ///
    /// If `capacity` is zero or greater than [Semaphore::MAX_PERMITS].
    pub fn with_capacity(interval: Duration, capacity: usize) -> Self {
        assert!(capacity >= 1, "capacity must be at least 1");
        assert!(
            capacity <= Semaphore::MAX_PERMITS,
            "capacity must be at most {}",
            Semaphore::MAX_PERMITS
        );

        Self {
            capacity,
            buffer: Mutex::new(Buffer {
                values: VecDeque::new(),
                closed: false,
            }),
            slots: Semaphore::new(capacity),
            ready: Notify::new(),
            gate: PacingGate::new(interval),
        }
    }

    /// Push a value onto the back of the queue, waiting until there is space for it.
    ///
    /// Fails if the queue is closed, either before the call or while waiting for space. The
    /// value is dropped in that case.
    ///
    /// Dropping the returned future before it completes never pushes the value.
    pub async fn push(&self, value: T) -> Result<(), ClosedError> {
        let permit = self.slots.acquire().await.map_err(|_| ClosedError)?;

        self.store(permit, value).map_err(|_| ClosedError)
    }

    /// Push a value without waiting. The value is handed back if the queue is full or closed.
    pub fn try_push(&self, value: T) -> Result<(), TryPushError<T>> {
        let permit = match self.slots.try_acquire() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits) => return Err(TryPushError::Full(value)),
            Err(TryAcquireError::Closed) => return Err(TryPushError::Closed(value)),
        };

        self.store(permit, value).map_err(TryPushError::Closed)
    }

    /// Push a value, waiting at most `duration` for space. The value is handed back on failure.
    pub async fn push_timeout(
        &self,
        value: T,
        duration: Duration,
    ) -> Result<(), PushTimeoutError<T>> {
        match time::timeout(duration, self.slots.acquire()).await {
            Ok(Ok(permit)) => self.store(permit, value).map_err(PushTimeoutError::Closed),
            Ok(Err(_)) => Err(PushTimeoutError::Closed(value)),
            Err(_) => Err(PushTimeoutError::Elapsed(value)),
        }
    }

    /// Pop the value at the front of the queue.
    ///
    /// Waits until a value is available, then until at least `interval` has passed since the
    /// previous value was released to any consumer.
    ///
    /// Returns `None` once the queue is closed and empty.
    ///
    /// The value is taken out of the queue before the pacing wait. Dropping the returned future
    /// during that wait discards the value.
    pub async fn pop(&self) -> Option<T> {
        let value = self.take().await?;

        self.gate.pass().await;

        Some(value)
    }

    /// Like [pop](PacedQueue::pop), but gives up if no value becomes available within
    /// `duration`.
    ///
    /// The timeout only covers waiting for a value. Once one has been taken it is always
    /// returned, after any pacing wait.
    pub async fn pop_timeout(&self, duration: Duration) -> Result<Option<T>, Elapsed> {
        let Some(value) = time::timeout(duration, self.take()).await? else {
            return Ok(None);
        };

        self.gate.pass().await;

        Ok(Some(value))
    }

    /// Close the queue. No more values can be pushed, but those already in it can be popped.
    ///
    /// Producers waiting for space fail. Consumers waiting on an empty queue get `None`.
    ///
    /// Only the first call succeeds.
    pub fn close(&self) -> Result<(), ClosedError> {
        let mut buffer = self.lock_buffer();
        if buffer.closed {
            return Err(ClosedError);
        }
        buffer.closed = true;
        let pending = buffer.values.len();
        drop(buffer);

        self.slots.close();
        self.ready.notify_waiters();

        debug!(pending, "closed paced queue");

        Ok(())
    }

    /// Whether the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.lock_buffer().closed
    }

    /// The number of values waiting to be popped.
    pub fn len(&self) -> usize {
        self.lock_buffer().values.len()
    }

    /// Whether no values are waiting to be popped.
    pub fn is_empty(&self) -> bool {
        self.lock_buffer().values.is_empty()
    }

    /// The maximum number of values the queue can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The minimum time between two releases.
    pub fn interval(&self) -> Duration {
        self.gate.interval()
    }

    /// The current state of the queue.
    pub fn state(&self) -> QueueState {
        let buffer = self.lock_buffer();
        QueueState {
            capacity: self.capacity,
            len: buffer.values.len(),
            available: if buffer.closed {
                0
            } else {
                self.slots.available_permits()
            },
            closed: buffer.closed,
        }
    }

    fn lock_buffer(&self) -> MutexGuard<'_, Buffer<T>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a value in a slot reserved by `permit`. Hands the value back if the queue closed
    /// after the slot was reserved.
    fn store(&self, permit: SemaphorePermit<'_>, value: T) -> Result<(), T> {
        let mut buffer = self.lock_buffer();
        if buffer.closed {
            return Err(value);
        }

        // The slot is given back by `take`.
        permit.forget();
        buffer.values.push_back(value);
        let len = buffer.values.len();
        drop(buffer);

        self.ready.notify_one();

        trace!(len, "pushed value");

        Ok(())
    }

    /// Wait for a value at the front of the queue and remove it, or `None` once drained.
    ///
    /// Cancel safe: a value is only removed in the same poll it is returned.
    async fn take(&self) -> Option<T> {
        loop {
            // Register interest before checking, so a push or close in between isn't missed.
            let ready = self.ready.notified();
            tokio::pin!(ready);
            ready.as_mut().enable();

            {
                let mut buffer = self.lock_buffer();
                if let Some(value) = buffer.values.pop_front() {
                    let len = buffer.values.len();
                    let drained = buffer.closed && len == 0;
                    drop(buffer);

                    self.slots.add_permits(1);

                    trace!(len, "popped value");
                    if drained {
                        debug!("paced queue drained");
                    }

                    return Some(value);
                }
                if buffer.closed {
                    return None;
                }
            }

            ready.await;
        }
    }
}

impl<T> PacedQueue<T>
where
    T: Default,
{
    /// Like [pop](PacedQueue::pop), but returns `(value, true)` on success and
    /// `(T::default(), false)` once the queue is closed and empty.
    pub async fn pop_ok(&self) -> (T, bool) {
        match self.pop().await {
            Some(value) => (value, true),
            None => (T::default(), false),
        }
    }
}
