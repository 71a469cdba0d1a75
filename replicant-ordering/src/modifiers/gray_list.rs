use std::cmp;
use std::sync::Arc;
use std::time::Duration;

use replicant_model::{Clock, Replica, ReplicaResult, SystemClock};
use replicant_storage::{ReplicaStorageProvider, StorageKey};

use crate::{OrderingContext, OrderingError, ReplicaWeightModifier};

pub const DEFAULT_GRAY_PERIOD: Duration = Duration::from_secs(3 * 60);
static DEFAULT_STORAGE_KEY: &str = "replicant.gray-list";

/// Provides how long a replica stays gray after it rejected a request.
pub trait GrayPeriodProvider: Send + Sync + 'static {
    fn gray_period(&self) -> anyhow::Result<Duration>;
}

#[derive(Debug, Copy, Clone)]
pub struct FixedGrayPeriodProvider(Duration);

impl FixedGrayPeriodProvider {
    pub fn new(period: Duration) -> Self {
        Self(period)
    }
}

impl Default for FixedGrayPeriodProvider {
    fn default() -> Self {
        Self(DEFAULT_GRAY_PERIOD)
    }
}

impl GrayPeriodProvider for FixedGrayPeriodProvider {
    fn gray_period(&self) -> anyhow::Result<Duration> {
        Ok(self.0)
    }
}

/// A gray period which is computed every time it is needed.
///
/// This allows the period to follow live configuration.
pub struct DynamicGrayPeriodProvider<F>(F);

impl<F> DynamicGrayPeriodProvider<F>
where
    F: Fn() -> anyhow::Result<Duration> + Send + Sync + 'static,
{
    pub fn new(provider: F) -> Self {
        Self(provider)
    }
}

impl<F> GrayPeriodProvider for DynamicGrayPeriodProvider<F>
where
    F: Fn() -> anyhow::Result<Duration> + Send + Sync + 'static,
{
    fn gray_period(&self) -> anyhow::Result<Duration> {
        (self.0)()
    }
}

/// Temporarily excludes replicas which recently rejected a request.
///
/// A replica which produced a [Verdict::Reject](replicant_model::Verdict::Reject)
/// has its weight dropped to zero for the gray period. Once the period has passed
/// the stored timestamp is cleared and the replica is treated as white again.
///
/// Failures of the local request body (stream and content reuse or input failures)
/// never gray-list a replica, they say nothing about its health.
pub struct GrayListModifier {
    period: Arc<dyn GrayPeriodProvider>,
    clock: Arc<dyn Clock>,
    storage_key: StorageKey,
}

impl GrayListModifier {
    pub fn new(period: impl GrayPeriodProvider) -> Self {
        Self {
            period: Arc::new(period),
            clock: Arc::new(SystemClock),
            storage_key: StorageKey::Borrowed(DEFAULT_STORAGE_KEY),
        }
    }

    /// A modifier using a fixed gray period.
    pub fn with_period(period: Duration) -> Self {
        Self::new(FixedGrayPeriodProvider::new(period))
    }

    /// Set the clock used to timestamp rejections.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Set the key the gray timestamps are stored under.
    pub fn with_storage_key(mut self, key: impl Into<StorageKey>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[inline]
    pub fn storage_key(&self) -> &str {
        self.storage_key.as_ref()
    }

    /// Returns the time the replica was last gray-listed, if it is still stored.
    pub fn gray_since(
        &self,
        replica: &Replica,
        storage: &ReplicaStorageProvider,
    ) -> Option<u64> {
        storage.obtain::<u64>(self.storage_key.clone()).get(replica)
    }
}

impl Default for GrayListModifier {
    fn default() -> Self {
        Self::new(FixedGrayPeriodProvider::default())
    }
}

impl ReplicaWeightModifier for GrayListModifier {
    fn modify(
        &self,
        replica: &Replica,
        ctx: &OrderingContext<'_>,
        weight: f64,
    ) -> Result<f64, OrderingError> {
        let stamps = ctx.storage.obtain::<u64>(self.storage_key.clone());
        let last_rejected = match stamps.get(replica) {
            Some(ts) => ts,
            None => return Ok(weight),
        };

        let period = self
            .period
            .gray_period()
            .map_err(OrderingError::Collaborator)?;
        let period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        let expires_at = last_rejected.saturating_add(period_ms);

        if self.clock.now_ms() < expires_at {
            return Ok(0.0);
        }

        // Only clear the stamp we read, a concurrent rejection may have refreshed it.
        if stamps.try_remove(replica, &last_rejected) {
            debug!(replica = %replica, "Replica has left the gray list.");
        }

        Ok(weight)
    }

    fn learn(
        &self,
        result: &ReplicaResult,
        storage: &ReplicaStorageProvider,
    ) -> Result<(), OrderingError> {
        if !result.verdict().is_reject() || result.code().is_stream_or_content_failure()
        {
            return Ok(());
        }

        let now = self.clock.now_ms();
        let stamps = storage.obtain::<u64>(self.storage_key.clone());
        stamps.update(result.replica(), |last| {
            Some(last.map_or(now, |last| cmp::max(*last, now)))
        });

        debug!(
            replica = %result.replica(),
            code = %result.code(),
            "Replica has been gray-listed."
        );

        Ok(())
    }
}
