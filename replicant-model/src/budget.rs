use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone)]
enum BudgetKind {
    Infinite,
    Fixed(Duration),
    Deadline { started: Instant, total: Duration },
}

#[derive(Debug, Copy, Clone)]
/// The amount of time a logical request is still allowed to take.
///
/// The remaining time is never negative, once the budget has been used up it
/// simply reports [Duration::ZERO].
pub struct TimeBudget(BudgetKind);

impl TimeBudget {
    /// A budget which never runs out.
    pub fn infinite() -> Self {
        Self(BudgetKind::Infinite)
    }

    /// Starts a new budget which counts down from `total` from now.
    pub fn start_new(total: Duration) -> Self {
        Self(BudgetKind::Deadline {
            started: Instant::now(),
            total,
        })
    }

    /// A budget frozen at the given remaining time.
    ///
    /// This is useful when a caller has already taken a snapshot of its own deadline.
    pub fn with_remaining(remaining: Duration) -> Self {
        Self(BudgetKind::Fixed(remaining))
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        matches!(self.0, BudgetKind::Infinite)
    }

    /// The total time of the budget.
    pub fn total(&self) -> Duration {
        match self.0 {
            BudgetKind::Infinite => Duration::MAX,
            BudgetKind::Fixed(remaining) => remaining,
            BudgetKind::Deadline { total, .. } => total,
        }
    }

    /// The time left before the budget is exhausted.
    pub fn remaining(&self) -> Duration {
        match self.0 {
            BudgetKind::Infinite => Duration::MAX,
            BudgetKind::Fixed(remaining) => remaining,
            BudgetKind::Deadline { started, total } => {
                total.saturating_sub(started.elapsed())
            },
        }
    }

    #[inline]
    pub fn has_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_remaining() {
        let budget = TimeBudget::with_remaining(Duration::from_secs(12));
        assert_eq!(budget.remaining(), Duration::from_secs(12));
        assert!(!budget.has_expired());

        let budget = TimeBudget::infinite();
        assert!(budget.is_infinite());
        assert_eq!(budget.remaining(), Duration::MAX);

        let budget = TimeBudget::start_new(Duration::from_secs(60));
        assert!(budget.remaining() <= Duration::from_secs(60));
        assert!(!budget.has_expired());
    }

    #[test]
    fn test_exhausted_budget_is_zero() {
        let budget = TimeBudget::start_new(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(budget.remaining(), Duration::ZERO);
        assert!(budget.has_expired());
    }
}
