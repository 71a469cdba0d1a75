mod ad_hoc;
mod equal;
mod fixed;

use std::time::Duration;

pub use ad_hoc::AdHocEqualDelaysProvider;
pub use equal::EqualDelaysProvider;
pub use fixed::{FixedDelaysProvider, TailDelayBehaviour};
use replicant_model::{Request, TimeBudget};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// How long to wait before forking the next attempt.
pub enum ForkingDelay {
    /// Fork the next attempt immediately.
    NoDelay,
    /// Fork the next attempt once the duration has passed without a result.
    Wait(Duration),
    /// Do not fork any further attempts for this request.
    Never,
}

impl ForkingDelay {
    /// Wraps a computed delay, a zero delay forks immediately.
    pub fn from_duration(delay: Duration) -> Self {
        if delay.is_zero() {
            Self::NoDelay
        } else {
            Self::Wait(delay)
        }
    }

    #[inline]
    pub fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }

    /// The delay as a duration, `None` if no further attempts should be forked.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::NoDelay => Some(Duration::ZERO),
            Self::Wait(delay) => Some(*delay),
            Self::Never => None,
        }
    }
}

/// Computes the delay before forking the next attempt of a request.
pub trait ForkingDelaysProvider: Send + Sync + 'static {
    /// Gets the delay before forking attempt number `attempt`.
    ///
    /// `attempt` is the zero based index of the attempt about to be forked and
    /// `total_replicas` is the number of replicas available to the request.
    fn forking_delay(
        &self,
        request: &Request,
        budget: &TimeBudget,
        attempt: usize,
        total_replicas: usize,
    ) -> ForkingDelay;
}

/// Splits the remaining budget into `parts` equal slices.
///
/// An infinite budget can not be divided and yields the largest possible delay.
pub(crate) fn divide_budget(budget: &TimeBudget, parts: usize) -> ForkingDelay {
    if budget.is_infinite() {
        return ForkingDelay::Wait(Duration::MAX);
    }

    let parts = u32::try_from(parts.max(1)).unwrap_or(u32::MAX);
    ForkingDelay::from_duration(budget.remaining() / parts)
}
