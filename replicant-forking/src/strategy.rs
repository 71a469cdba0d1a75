use std::sync::Arc;

use replicant_model::{Request, TimeBudget};

use crate::{ConfigError, ForkingDelay, ForkingDelaysProvider};

#[derive(Clone)]
/// Pairs a delays provider with a cap on the number of parallel attempts.
pub struct ForkingStrategy {
    provider: Arc<dyn ForkingDelaysProvider>,
    maximum_parallelism: usize,
}

impl ForkingStrategy {
    pub fn new(
        provider: impl ForkingDelaysProvider,
        maximum_parallelism: usize,
    ) -> Result<Self, ConfigError> {
        Self::with_shared_provider(Arc::new(provider), maximum_parallelism)
    }

    pub fn with_shared_provider(
        provider: Arc<dyn ForkingDelaysProvider>,
        maximum_parallelism: usize,
    ) -> Result<Self, ConfigError> {
        if maximum_parallelism == 0 {
            return Err(ConfigError::ZeroParallelism);
        }

        Ok(Self {
            provider,
            maximum_parallelism,
        })
    }

    #[inline]
    pub fn maximum_parallelism(&self) -> usize {
        self.maximum_parallelism
    }

    /// Gets the delay before forking attempt number `attempt`.
    ///
    /// No attempt is forked once `in_flight` attempts have reached the
    /// parallelism cap, or once every replica has been tried.
    pub fn forking_delay(
        &self,
        request: &Request,
        budget: &TimeBudget,
        attempt: usize,
        total_replicas: usize,
        in_flight: usize,
    ) -> ForkingDelay {
        if attempt >= total_replicas {
            return ForkingDelay::Never;
        }

        if in_flight >= self.maximum_parallelism {
            trace!(
                in_flight = in_flight,
                maximum_parallelism = self.maximum_parallelism,
                "Parallelism cap reached, not forking."
            );
            return ForkingDelay::Never;
        }

        self.provider
            .forking_delay(request, budget, attempt, total_replicas)
    }
}
