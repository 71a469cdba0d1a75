use std::time::Duration;

use replicant_model::{Request, TimeBudget};

use super::{divide_budget, ForkingDelay, ForkingDelaysProvider};
use crate::ConfigError;

#[derive(Debug, Clone)]
/// Uses explicit delays for the first attempts and then splits the remaining
/// budget equally.
///
/// Unlike [EqualDelaysProvider](super::EqualDelaysProvider) the division factor
/// is applied as is, regardless of the number of replicas.
pub struct AdHocEqualDelaysProvider {
    delays: Vec<Duration>,
    division_factor: usize,
}

impl AdHocEqualDelaysProvider {
    pub fn new(
        delays: Vec<Duration>,
        division_factor: usize,
    ) -> Result<Self, ConfigError> {
        if division_factor == 0 {
            return Err(ConfigError::ZeroDivisionFactor);
        }

        Ok(Self {
            delays,
            division_factor,
        })
    }

    #[inline]
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    #[inline]
    pub fn division_factor(&self) -> usize {
        self.division_factor
    }
}

impl ForkingDelaysProvider for AdHocEqualDelaysProvider {
    fn forking_delay(
        &self,
        _request: &Request,
        budget: &TimeBudget,
        attempt: usize,
        _total_replicas: usize,
    ) -> ForkingDelay {
        match self.delays.get(attempt) {
            Some(delay) => ForkingDelay::from_duration(*delay),
            None => divide_budget(budget, self.division_factor),
        }
    }
}
