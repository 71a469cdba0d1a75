use replicant_model::{Request, TimeBudget};

use super::{divide_budget, ForkingDelay, ForkingDelaysProvider};
use crate::ConfigError;

#[derive(Debug, Copy, Clone)]
/// Gives every attempt an equal slice of the remaining budget.
///
/// The budget is never split into more slices than there are replicas.
pub struct EqualDelaysProvider {
    division_factor: usize,
}

impl EqualDelaysProvider {
    pub fn new(division_factor: usize) -> Result<Self, ConfigError> {
        if division_factor == 0 {
            return Err(ConfigError::ZeroDivisionFactor);
        }

        Ok(Self { division_factor })
    }

    #[inline]
    pub fn division_factor(&self) -> usize {
        self.division_factor
    }
}

impl ForkingDelaysProvider for EqualDelaysProvider {
    fn forking_delay(
        &self,
        _request: &Request,
        budget: &TimeBudget,
        _attempt: usize,
        total_replicas: usize,
    ) -> ForkingDelay {
        let parts = self.division_factor.min(total_replicas.max(1));
        divide_budget(budget, parts)
    }
}
