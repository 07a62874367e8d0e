use std::time::Duration;

use tokio::{
    sync::Mutex,
    time::{self, Instant},
};
use tracing::trace;

/// Stand-in for an interval too long to add to an [Instant]. Roughly 30 years.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Spaces out releases so that consecutive ones are at least `interval` apart.
///
/// Shared by every consumer of a queue, so the spacing is global rather than per consumer.
#[derive(Debug)]
pub(crate) struct PacingGate {
    interval: Duration,

    /// The earliest instant at which the next release may happen. Only ever moves forwards.
    next_release: Mutex<Instant>,
}

impl PacingGate {
    /// The first release may happen immediately.
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_release: Mutex::new(Instant::now()),
        }
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until a release is allowed, then record it. Returns the release instant.
    ///
    /// The lock is held while sleeping: waiting and moving the watermark happen as one unit, so
    /// two callers can never both decide it's their turn.
    ///
    /// The watermark is based on when the previous release actually happened. A caller arriving
    /// long after the watermark passes straight through, with no catching up on missed slots.
    pub(crate) async fn pass(&self) -> Instant {
        let mut next_release = self.next_release.lock().await;

        let now = Instant::now();
        if *next_release > now {
            trace!(wait = ?(*next_release - now), "waiting for pacing gate");
            time::sleep_until(*next_release).await;
        }

        let released = Instant::now();
        *next_release = released
            .checked_add(self.interval)
            .unwrap_or_else(|| released + FAR_FUTURE);

        released
    }
}
