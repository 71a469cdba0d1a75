use std::sync::Arc;
use std::time::Duration;

use replicant_model::{Clock, Replica, ReplicaResult, SystemClock};
use replicant_storage::{ReplicaStorageProvider, StorageKey};

use crate::{
    AdaptiveHealthAction,
    ConfigError,
    OrderingContext,
    OrderingError,
    ReplicaWeightModifier,
    TuningPolicy,
};

static DEFAULT_STORAGE_KEY: &str = "replicant.adaptive-health";
const NEUTRAL_HEALTH: f64 = 1.0;

#[derive(Debug, Copy, Clone, PartialEq)]
/// The stored health of a replica.
///
/// A value of `1.0` is neutral, lower values scale the replica's weight down and
/// higher values scale it up. After a change the value moves linearly back towards
/// neutral, reaching it once the decay duration has passed since `decay_pivot`.
pub struct Health {
    pub value: f64,
    /// Unix timestamp in milliseconds the recovery is measured from.
    pub decay_pivot: u64,
}

#[derive(Debug, Copy, Clone)]
/// Tunables of the adaptive health modifier.
pub struct HealthSettings {
    /// The factor health is multiplied by on [AdaptiveHealthAction::Increase].
    ///
    /// Defaults to `1.5`, must be greater than `1.0`.
    pub up_multiplier: f64,
    /// The factor health is multiplied by on [AdaptiveHealthAction::Decrease].
    ///
    /// Defaults to `0.5`, must be between `0.0` and `1.0` exclusive.
    pub down_multiplier: f64,
    /// The floor health can never drop below.
    ///
    /// Defaults to `0.05`, must be in `(0.0, 1.0]`.
    pub minimum_health: f64,
    /// The ceiling health can never rise above.
    ///
    /// Defaults to `1.0`, must be finite and at least `1.0`.
    pub maximum_health: f64,
    /// How long it takes a damaged replica to fully recover without any new results.
    ///
    /// Defaults to 10 minutes, must be non-zero.
    pub decay_duration: Duration,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            up_multiplier: 1.5,
            down_multiplier: 0.5,
            minimum_health: 0.05,
            maximum_health: 1.0,
            decay_duration: Duration::from_secs(10 * 60),
        }
    }
}

impl HealthSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.up_multiplier.is_finite() || self.up_multiplier <= 1.0 {
            return Err(ConfigError::InvalidHealth(
                "up multiplier must be a finite number greater than 1.0",
            ));
        }

        if !(self.down_multiplier > 0.0 && self.down_multiplier < 1.0) {
            return Err(ConfigError::InvalidHealth(
                "down multiplier must be between 0.0 and 1.0 exclusive",
            ));
        }

        if !(self.minimum_health > 0.0 && self.minimum_health <= 1.0) {
            return Err(ConfigError::InvalidHealth(
                "minimum health must be greater than 0.0 and at most 1.0",
            ));
        }

        if !(self.maximum_health.is_finite() && self.maximum_health >= 1.0) {
            return Err(ConfigError::InvalidHealth(
                "maximum health must be a finite number of at least 1.0",
            ));
        }

        if self.minimum_health > self.maximum_health {
            return Err(ConfigError::InvalidHealth(
                "minimum health must not be greater than maximum health",
            ));
        }

        if self.decay_duration.is_zero() {
            return Err(ConfigError::InvalidHealth("decay duration must be non-zero"));
        }

        Ok(())
    }
}

/// Scales replica weights by a health score learned from past results.
///
/// The [TuningPolicy] decides whether a result should raise or lower the health,
/// replicas without any stored health are treated as neutral.
pub struct AdaptiveHealthModifier {
    policy: Arc<dyn TuningPolicy>,
    settings: HealthSettings,
    clock: Arc<dyn Clock>,
    storage_key: StorageKey,
}

impl AdaptiveHealthModifier {
    pub fn new(
        policy: impl TuningPolicy,
        settings: HealthSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;

        Ok(Self {
            policy: Arc::new(policy),
            settings,
            clock: Arc::new(SystemClock),
            storage_key: StorageKey::Borrowed(DEFAULT_STORAGE_KEY),
        })
    }

    /// Set the clock used to measure health recovery.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Set the key the health values are stored under.
    pub fn with_storage_key(mut self, key: impl Into<StorageKey>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[inline]
    pub fn settings(&self) -> &HealthSettings {
        &self.settings
    }

    /// The health of the replica right now, including any recovery since the last decrease.
    pub fn current_health(&self, replica: &Replica, storage: &ReplicaStorageProvider) -> f64 {
        storage
            .obtain::<Health>(self.storage_key.clone())
            .get(replica)
            .map(|health| self.effective_value(&health, self.clock.now_ms()))
            .unwrap_or(NEUTRAL_HEALTH)
    }

    fn effective_value(&self, health: &Health, now: u64) -> f64 {
        let elapsed = now.saturating_sub(health.decay_pivot) as f64;
        let decay = self.settings.decay_duration.as_millis() as f64;
        let recovered = (elapsed / decay).min(1.0);

        (health.value + (NEUTRAL_HEALTH - health.value) * recovered).clamp(
            self.settings.minimum_health,
            self.settings.maximum_health,
        )
    }

    /// Applies an increase or decrease, returning `None` for neutral health.
    fn next_health(&self, action: AdaptiveHealthAction, current: f64, now: u64) -> Option<Health> {
        let value = match action {
            AdaptiveHealthAction::Increase => current * self.settings.up_multiplier,
            AdaptiveHealthAction::Decrease => current * self.settings.down_multiplier,
            AdaptiveHealthAction::DontTouch => current,
        };
        let value = value.clamp(self.settings.minimum_health, self.settings.maximum_health);

        if value == NEUTRAL_HEALTH {
            None
        } else {
            Some(Health {
                value,
                decay_pivot: now,
            })
        }
    }
}

impl ReplicaWeightModifier for AdaptiveHealthModifier {
    fn modify(
        &self,
        replica: &Replica,
        ctx: &OrderingContext<'_>,
        weight: f64,
    ) -> Result<f64, OrderingError> {
        Ok(weight * self.current_health(replica, ctx.storage))
    }

    fn learn(
        &self,
        result: &ReplicaResult,
        storage: &ReplicaStorageProvider,
    ) -> Result<(), OrderingError> {
        let action = self.policy.select_action(result);
        if action == AdaptiveHealthAction::DontTouch {
            return Ok(());
        }

        let replica = result.replica();
        let healths = storage.obtain::<Health>(self.storage_key.clone());
        let now = self.clock.now_ms();

        loop {
            let current = healths.get(replica);
            let current_value = current
                .as_ref()
                .map(|health| self.effective_value(health, now))
                .unwrap_or(NEUTRAL_HEALTH);
            let next = self.next_health(action, current_value, now);

            let applied = match (current, next) {
                // Neutral health is never stored.
                (None, None) => return Ok(()),
                (None, Some(next)) => healths.try_add(replica.clone(), next),
                (Some(current), None) => healths.try_remove(replica, &current),
                (Some(current), Some(next)) => healths.try_update(replica, next, &current),
            };

            if applied {
                debug!(
                    replica = %replica,
                    action = ?action,
                    previous_health = current_value,
                    health = next.map(|health| health.value).unwrap_or(NEUTRAL_HEALTH),
                    "Replica health has changed."
                );
                return Ok(());
            }
        }
    }
}
