use std::time::Duration;

use replicant_model::{Request, TimeBudget};

use super::{ForkingDelay, ForkingDelaysProvider};
use crate::ConfigError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
/// What a [FixedDelaysProvider] does once every configured delay has been used.
pub enum TailDelayBehaviour {
    #[default]
    /// No further attempts are forked.
    StopIssuingDelays,
    /// The last configured delay is used for every further attempt.
    RepeatLastValue,
    /// The configured delays are cycled through from the start.
    RepeatAllValues,
}

#[derive(Debug, Clone)]
/// Uses a fixed list of delays, one per attempt.
pub struct FixedDelaysProvider {
    delays: Vec<Duration>,
    tail: TailDelayBehaviour,
}

impl FixedDelaysProvider {
    pub fn new(
        delays: Vec<Duration>,
        tail: TailDelayBehaviour,
    ) -> Result<Self, ConfigError> {
        if delays.is_empty() {
            return Err(ConfigError::EmptyDelays);
        }

        Ok(Self { delays, tail })
    }

    #[inline]
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    #[inline]
    pub fn tail(&self) -> TailDelayBehaviour {
        self.tail
    }

    fn delay_for(&self, attempt: usize) -> Option<Duration> {
        if let Some(delay) = self.delays.get(attempt) {
            return Some(*delay);
        }

        match self.tail {
            TailDelayBehaviour::StopIssuingDelays => None,
            TailDelayBehaviour::RepeatLastValue => self.delays.last().copied(),
            TailDelayBehaviour::RepeatAllValues => {
                Some(self.delays[attempt % self.delays.len()])
            },
        }
    }
}

impl ForkingDelaysProvider for FixedDelaysProvider {
    fn forking_delay(
        &self,
        _request: &Request,
        _budget: &TimeBudget,
        attempt: usize,
        _total_replicas: usize,
    ) -> ForkingDelay {
        match self.delay_for(attempt) {
            Some(delay) => ForkingDelay::from_duration(delay),
            None => {
                trace!(attempt = attempt, "Fixed forking delays exhausted.");
                ForkingDelay::Never
            },
        }
    }
}
