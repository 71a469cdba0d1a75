use std::sync::Arc;
use std::time::Duration;

use replicant_model::{ReplicaResult, Verdict};

use crate::ConfigError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// What should happen to a replica's health after a result.
pub enum AdaptiveHealthAction {
    Increase,
    Decrease,
    DontTouch,
}

impl AdaptiveHealthAction {
    /// Combines two actions, any decrease wins over an increase.
    pub fn combine(self, other: Self) -> Self {
        use AdaptiveHealthAction::*;

        match (self, other) {
            (Decrease, _) | (_, Decrease) => Decrease,
            (Increase, _) | (_, Increase) => Increase,
            (DontTouch, DontTouch) => DontTouch,
        }
    }
}

/// Picks the health action for a completed result.
pub trait TuningPolicy: Send + Sync + 'static {
    fn select_action(&self, result: &ReplicaResult) -> AdaptiveHealthAction;
}

#[derive(Debug, Copy, Clone)]
/// Punishes replicas which respond slower than a threshold.
pub struct ResponseTimeTuningPolicy {
    threshold: Duration,
}

impl ResponseTimeTuningPolicy {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }
}

impl TuningPolicy for ResponseTimeTuningPolicy {
    fn select_action(&self, result: &ReplicaResult) -> AdaptiveHealthAction {
        if result.elapsed() >= self.threshold {
            AdaptiveHealthAction::Decrease
        } else {
            AdaptiveHealthAction::Increase
        }
    }
}

#[derive(Debug, Copy, Clone, Default)]
/// Follows the verdict of the result.
///
/// Failures of the local request body never touch the health.
pub struct ResponseVerdictTuningPolicy;

impl TuningPolicy for ResponseVerdictTuningPolicy {
    fn select_action(&self, result: &ReplicaResult) -> AdaptiveHealthAction {
        if result.code().is_stream_or_content_failure() {
            return AdaptiveHealthAction::DontTouch;
        }

        match result.verdict() {
            Verdict::Accept => AdaptiveHealthAction::Increase,
            Verdict::Reject => AdaptiveHealthAction::Decrease,
            Verdict::DontKnow => AdaptiveHealthAction::DontTouch,
        }
    }
}

#[derive(Clone)]
/// Asks several policies and combines their answers.
pub struct CompositeTuningPolicy {
    policies: Vec<Arc<dyn TuningPolicy>>,
}

impl CompositeTuningPolicy {
    pub fn new(policies: Vec<Arc<dyn TuningPolicy>>) -> Result<Self, ConfigError> {
        if policies.is_empty() {
            return Err(ConfigError::EmptyTuningPolicies);
        }

        Ok(Self { policies })
    }
}

impl TuningPolicy for CompositeTuningPolicy {
    fn select_action(&self, result: &ReplicaResult) -> AdaptiveHealthAction {
        self.policies
            .iter()
            .map(|policy| policy.select_action(result))
            .fold(AdaptiveHealthAction::DontTouch, AdaptiveHealthAction::combine)
    }
}
