use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Minimum gap between two progress snapshots.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);
/// Delay before the first solution batch.
pub const FIRST_BATCH_DELAY: Duration = Duration::from_millis(500);
/// Minimum gap between later solution batches.
pub const BATCH_INTERVAL: Duration = Duration::from_millis(3000);

/// Time source for throttling. Readings are offsets from an arbitrary fixed epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Monotonic wall clock.
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Deterministic clock for tests.
///
/// Time moves only through [`ManualClock::advance`], plus an optional fixed step
/// added after every reading.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
    step_millis: u64,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that moves forward by `step` each time it is read.
    #[must_use]
    pub fn stepping(step: Duration) -> Self {
        Self {
            millis: AtomicU64::new(0),
            step_millis: duration_millis(step),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(duration_millis(by), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        let millis = self.millis.fetch_add(self.step_millis, Ordering::SeqCst);
        Duration::from_millis(millis)
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Emission bookkeeping for one search.
#[derive(Clone, Debug)]
pub struct Throttle {
    last_progress: Duration,
    last_batch: Duration,
    sent_first_batch: bool,
}

impl Throttle {
    #[must_use]
    pub fn new(now: Duration) -> Self {
        Self {
            last_progress: now,
            last_batch: now,
            sent_first_batch: false,
        }
    }

    /// True when a progress snapshot should go out now; records the emission time.
    pub fn progress_due(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last_progress) > PROGRESS_INTERVAL {
            self.last_progress = now;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn batch_due(&self, now: Duration) -> bool {
        let interval = if self.sent_first_batch {
            BATCH_INTERVAL
        } else {
            FIRST_BATCH_DELAY
        };
        now.saturating_sub(self.last_batch) > interval
    }

    /// Record a batch attempt. The short first delay stays in force until something was sent.
    pub fn record_batch(&mut self, now: Duration, sent: bool) {
        self.last_batch = now;
        if sent {
            self.sent_first_batch = true;
        }
    }
}
