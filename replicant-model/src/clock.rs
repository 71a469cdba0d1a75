use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crossbeam_utils::atomic::AtomicCell;

/// A source of the current wall-clock time, in milliseconds since the unix epoch.
pub trait Clock: Send + Sync + 'static {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Copy, Clone, Default)]
/// The real UTC wall-clock.
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        get_unix_timestamp_ms()
    }
}

#[derive(Debug, Clone)]
/// A clock which only moves when told to.
///
/// Clones share the same underlying time, so a test can hold one handle
/// while the modifiers under test hold another.
pub struct ManualClock(Arc<AtomicCell<u64>>);

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self(Arc::new(AtomicCell::new(now_ms)))
    }

    /// Moves the clock forward by the given duration.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        let _ = self
            .0
            .fetch_update(|now| Some(now.saturating_add(by)));
    }

    /// Sets the clock to an exact point in time.
    pub fn set(&self, now_ms: u64) {
        self.0.store(now_ms);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(get_unix_timestamp_ms())
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.0.load()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

pub fn get_unix_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
