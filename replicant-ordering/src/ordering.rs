use std::sync::atomic::Ordering;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{thread_rng, Rng, SeedableRng};
use replicant_model::{Replica, ReplicaResult, Request, RequestParameters};
use replicant_storage::ReplicaStorageProvider;

use crate::{
    ConfigError,
    OrderingError,
    OrderingStatistics,
    ReplicaOrder,
    ReplicaWeightModifier,
};

#[derive(Copy, Clone)]
/// Everything a modifier may look at while weighing a replica.
pub struct OrderingContext<'a> {
    /// The full set of replicas being ordered.
    pub replicas: &'a [Replica],
    pub storage: &'a ReplicaStorageProvider,
    pub request: &'a Request,
    pub parameters: &'a RequestParameters,
}

/// Produces the order replicas should be contacted in.
pub trait ReplicaOrdering: Send + Sync {
    /// Orders the given replicas for a single request.
    ///
    /// The returned order is a permutation of `replicas`.
    fn order(
        &self,
        replicas: &[Replica],
        storage: &ReplicaStorageProvider,
        request: &Request,
        parameters: &RequestParameters,
    ) -> Result<ReplicaOrder, OrderingError>;

    /// Learns from the result of a completed attempt.
    fn learn(
        &self,
        result: &ReplicaResult,
        storage: &ReplicaStorageProvider,
    ) -> Result<(), OrderingError>;
}

fn new_rng() -> StdRng {
    StdRng::seed_from_u64(thread_rng().gen())
}

#[derive(Debug, Copy, Clone)]
/// The bounds every computed weight is clamped to.
pub struct WeightSettings {
    /// The weight every replica starts with before any modifier runs.
    ///
    /// Defaults to `1.0`.
    pub initial_weight: f64,
    /// Defaults to `0.0`.
    pub minimum_weight: f64,
    /// Defaults to `10.0`.
    pub maximum_weight: f64,
}

impl Default for WeightSettings {
    fn default() -> Self {
        Self {
            initial_weight: 1.0,
            minimum_weight: 0.0,
            maximum_weight: 10.0,
        }
    }
}

impl WeightSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all_finite = self.initial_weight.is_finite()
            && self.minimum_weight.is_finite()
            && self.maximum_weight.is_finite();
        if !all_finite {
            return Err(ConfigError::InvalidWeights("weights must be finite"));
        }

        if self.minimum_weight < 0.0 {
            return Err(ConfigError::InvalidWeights("minimum weight must not be negative"));
        }

        if self.minimum_weight > self.initial_weight || self.initial_weight > self.maximum_weight
        {
            return Err(ConfigError::InvalidWeights(
                "weights must satisfy minimum <= initial <= maximum",
            ));
        }

        Ok(())
    }

    /// Brings a modified weight back into the configured bounds.
    ///
    /// `NaN` is treated as the lowest possible weight.
    fn clamp(&self, weight: f64) -> f64 {
        if weight.is_nan() {
            return self.minimum_weight;
        }

        weight.clamp(self.minimum_weight, self.maximum_weight)
    }
}

/// Build a weighted replica ordering from a chain of modifiers.
pub struct WeightedReplicaOrderingBuilder {
    modifiers: Vec<Arc<dyn ReplicaWeightModifier>>,
    settings: WeightSettings,
}

impl Default for WeightedReplicaOrderingBuilder {
    fn default() -> Self {
        Self {
            modifiers: Vec::new(),
            settings: WeightSettings::default(),
        }
    }
}

impl WeightedReplicaOrderingBuilder {
    /// Appends a modifier to the end of the chain.
    ///
    /// Modifiers run in the order they were added, each seeing the weight
    /// produced by the ones before it.
    pub fn with_modifier(mut self, modifier: impl ReplicaWeightModifier) -> Self {
        self.modifiers.push(Arc::new(modifier));
        self
    }

    /// Appends an already shared modifier to the end of the chain.
    pub fn with_shared_modifier(mut self, modifier: Arc<dyn ReplicaWeightModifier>) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_initial_weight(mut self, weight: f64) -> Self {
        self.settings.initial_weight = weight;
        self
    }

    pub fn with_minimum_weight(mut self, weight: f64) -> Self {
        self.settings.minimum_weight = weight;
        self
    }

    pub fn with_maximum_weight(mut self, weight: f64) -> Self {
        self.settings.maximum_weight = weight;
        self
    }

    pub fn build(self) -> Result<WeightedReplicaOrdering, ConfigError> {
        self.settings.validate()?;

        Ok(WeightedReplicaOrdering {
            modifiers: self.modifiers,
            settings: self.settings,
            statistics: OrderingStatistics::default(),
        })
    }
}

/// Orders replicas by a weighted random draw.
///
/// Weights start at the initial weight and are passed through every modifier
/// in order, replicas with higher weights are more likely to be drawn earlier.
/// Replicas with a weight of zero are only drawn once every replica with a
/// positive weight has been drawn.
pub struct WeightedReplicaOrdering {
    modifiers: Vec<Arc<dyn ReplicaWeightModifier>>,
    settings: WeightSettings,
    statistics: OrderingStatistics,
}

impl WeightedReplicaOrdering {
    #[inline]
    pub fn settings(&self) -> &WeightSettings {
        &self.settings
    }

    #[inline]
    pub fn num_modifiers(&self) -> usize {
        self.modifiers.len()
    }

    #[inline]
    /// Gets the live ordering statistics.
    pub fn statistics(&self) -> OrderingStatistics {
        self.statistics.clone()
    }

    /// Computes the final weight of a single replica.
    pub fn weigh(
        &self,
        replica: &Replica,
        ctx: &OrderingContext<'_>,
    ) -> Result<f64, OrderingError> {
        let weight = self
            .modifiers
            .iter()
            .try_fold(self.settings.initial_weight, |weight, modifier| {
                modifier.modify(replica, ctx, weight)
            })
            .map_err(|e| {
                self.statistics
                    .num_modifier_failures
                    .fetch_add(1, Ordering::Relaxed);
                e
            })?;

        Ok(self.settings.clamp(weight))
    }

    /// Orders the replicas using the provided random number generator.
    pub fn order_with_rng<R: Rng>(
        &self,
        replicas: &[Replica],
        storage: &ReplicaStorageProvider,
        request: &Request,
        parameters: &RequestParameters,
        rng: R,
    ) -> Result<ReplicaOrder<R>, OrderingError> {
        let ctx = OrderingContext {
            replicas,
            storage,
            request,
            parameters,
        };

        let mut candidates = Vec::with_capacity(replicas.len());
        for replica in replicas {
            let weight = self.weigh(replica, &ctx)?;
            trace!(replica = %replica, weight = weight, "Computed replica weight.");
            candidates.push((replica.clone(), weight));
        }

        let num_zero_weights = candidates
            .iter()
            .filter(|(_, weight)| *weight <= 0.0)
            .count();
        self.statistics.num_orders.fetch_add(1, Ordering::Relaxed);
        self.statistics
            .num_zero_weight_replicas
            .fetch_add(num_zero_weights as u64, Ordering::Relaxed);

        Ok(ReplicaOrder::weighted(candidates, rng))
    }
}

impl ReplicaOrdering for WeightedReplicaOrdering {
    fn order(
        &self,
        replicas: &[Replica],
        storage: &ReplicaStorageProvider,
        request: &Request,
        parameters: &RequestParameters,
    ) -> Result<ReplicaOrder, OrderingError> {
        self.order_with_rng(replicas, storage, request, parameters, new_rng())
    }

    /// Passes the result to every modifier.
    ///
    /// Every modifier learns even if an earlier one fails, the first error is returned.
    fn learn(
        &self,
        result: &ReplicaResult,
        storage: &ReplicaStorageProvider,
    ) -> Result<(), OrderingError> {
        let mut first_error = None;
        for modifier in self.modifiers.iter() {
            if let Err(e) = modifier.learn(result, storage) {
                warn!(
                    replica = %result.replica(),
                    error = %e,
                    "Weight modifier failed to learn from result."
                );
                self.statistics
                    .num_modifier_failures
                    .fetch_add(1, Ordering::Relaxed);
                first_error.get_or_insert(e);
            }
        }

        self.statistics
            .num_learned_results
            .fetch_add(1, Ordering::Relaxed);

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Copy, Clone, Default)]
/// Orders replicas uniformly at random and never learns.
pub struct RandomReplicaOrdering;

impl ReplicaOrdering for RandomReplicaOrdering {
    fn order(
        &self,
        replicas: &[Replica],
        _storage: &ReplicaStorageProvider,
        _request: &Request,
        _parameters: &RequestParameters,
    ) -> Result<ReplicaOrder, OrderingError> {
        let candidates = replicas
            .iter()
            .map(|replica| (replica.clone(), 1.0))
            .collect();
        Ok(ReplicaOrder::weighted(candidates, new_rng()))
    }

    fn learn(
        &self,
        _result: &ReplicaResult,
        _storage: &ReplicaStorageProvider,
    ) -> Result<(), OrderingError> {
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Default)]
/// Keeps replicas in the order they were given.
pub struct AsIsReplicaOrdering;

impl ReplicaOrdering for AsIsReplicaOrdering {
    fn order(
        &self,
        replicas: &[Replica],
        _storage: &ReplicaStorageProvider,
        _request: &Request,
        _parameters: &RequestParameters,
    ) -> Result<ReplicaOrder, OrderingError> {
        Ok(ReplicaOrder::as_is(replicas, new_rng()))
    }

    fn learn(
        &self,
        _result: &ReplicaResult,
        _storage: &ReplicaStorageProvider,
    ) -> Result<(), OrderingError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use super::*;
    use crate::{GrayListModifier, LeadershipModifier};

    fn request() -> Request {
        Request::get("/ping".parse().unwrap())
    }

    fn assert_permutation(order: impl Iterator<Item = Replica>, replicas: &[Replica]) {
        let order = order.collect::<Vec<_>>();
        assert_eq!(order.len(), replicas.len());

        let unique = order.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), replicas.len(), "Order contains duplicates.");
        assert!(replicas.iter().all(|replica| unique.contains(replica)));
    }

    #[test]
    fn test_weight_settings_validation() {
        assert!(WeightSettings::default().validate().is_ok());

        let invalid = [
            WeightedReplicaOrderingBuilder::default().with_minimum_weight(-1.0),
            WeightedReplicaOrderingBuilder::default().with_initial_weight(20.0),
            WeightedReplicaOrderingBuilder::default().with_maximum_weight(0.5),
            WeightedReplicaOrderingBuilder::default().with_initial_weight(f64::NAN),
            WeightedReplicaOrderingBuilder::default().with_maximum_weight(f64::INFINITY),
        ];
        for builder in invalid {
            assert!(builder.build().is_err());
        }
    }

    #[test]
    fn test_orderings_are_permutations() {
        let storage = ReplicaStorageProvider::instance();
        let parameters = RequestParameters::default();
        let replicas = test_helper::make_replicas(10);

        let weighted = WeightedReplicaOrderingBuilder::default()
            .with_modifier(GrayListModifier::with_period(Duration::from_secs(60)))
            .with_modifier(LeadershipModifier::default())
            .build()
            .expect("Build ordering");
        let no_modifiers = WeightedReplicaOrderingBuilder::default()
            .build()
            .expect("Build ordering");

        let orderings: [&dyn ReplicaOrdering; 4] = [
            &weighted,
            &no_modifiers,
            &RandomReplicaOrdering,
            &AsIsReplicaOrdering,
        ];
        for ordering in orderings {
            for _ in 0..20 {
                let order = ordering
                    .order(&replicas, &storage, &request(), &parameters)
                    .expect("Order replicas");
                assert_permutation(order, &replicas);
            }

            let order = ordering
                .order(&[], &storage, &request(), &parameters)
                .expect("Order replicas");
            assert_eq!(order.count(), 0);
        }
    }

    #[test]
    fn test_as_is_ordering() {
        let storage = ReplicaStorageProvider::instance();
        let replicas = test_helper::make_replicas(6);

        let order = AsIsReplicaOrdering
            .order(&replicas, &storage, &request(), &RequestParameters::default())
            .expect("Order replicas");
        assert_eq!(order.collect::<Vec<_>>(), replicas);
    }

    #[test]
    fn test_gray_replica_is_ordered_last() {
        let storage = ReplicaStorageProvider::instance();
        let parameters = RequestParameters::default();
        let replicas = test_helper::make_replicas(5);
        let ordering = WeightedReplicaOrderingBuilder::default()
            .with_modifier(GrayListModifier::with_period(Duration::from_secs(60)))
            .build()
            .expect("Build ordering");

        ordering
            .learn(&test_helper::rejected(&replicas[2]), &storage)
            .expect("Learn result");

        for seed in 0..50 {
            let order = ordering
                .order_with_rng(
                    &replicas,
                    &storage,
                    &request(),
                    &parameters,
                    StdRng::seed_from_u64(seed),
                )
                .expect("Order replicas")
                .collect::<Vec<_>>();
            assert_eq!(order.last(), Some(&replicas[2]));
        }

        let stats = ordering.statistics();
        assert_eq!(stats.num_orders(), 50);
        assert_eq!(stats.num_zero_weight_replicas(), 50);
        assert_eq!(stats.num_learned_results(), 1);
    }

    #[test]
    fn test_weights_are_clamped() {
        let storage = ReplicaStorageProvider::instance();
        let parameters = RequestParameters::default();
        let replicas = test_helper::make_replicas(1);
        let request = request();
        let ctx = OrderingContext {
            replicas: &replicas,
            storage: &storage,
            request: &request,
            parameters: &parameters,
        };

        let ordering = WeightedReplicaOrderingBuilder::default()
            .with_modifier(ScaleModifier(100.0))
            .with_maximum_weight(5.0)
            .build()
            .expect("Build ordering");
        assert_eq!(ordering.weigh(&replicas[0], &ctx).expect("Weigh replica"), 5.0);

        let ordering = WeightedReplicaOrderingBuilder::default()
            .with_modifier(ScaleModifier(f64::NAN))
            .build()
            .expect("Build ordering");
        assert_eq!(ordering.weigh(&replicas[0], &ctx).expect("Weigh replica"), 0.0);

        let ordering = WeightedReplicaOrderingBuilder::default()
            .with_modifier(ScaleModifier(-3.0))
            .with_minimum_weight(0.1)
            .build()
            .expect("Build ordering");
        assert_eq!(ordering.weigh(&replicas[0], &ctx).expect("Weigh replica"), 0.1);
    }

    #[test]
    fn test_modifiers_run_in_order() {
        let storage = ReplicaStorageProvider::instance();
        let parameters = RequestParameters::default();
        let replicas = test_helper::make_replicas(1);
        let request = request();
        let ctx = OrderingContext {
            replicas: &replicas,
            storage: &storage,
            request: &request,
            parameters: &parameters,
        };

        // A reservist stays at zero regardless of what comes after it.
        let ordering = WeightedReplicaOrderingBuilder::default()
            .with_modifier(LeadershipModifier::default())
            .with_modifier(ScaleModifier(4.0))
            .build()
            .expect("Build ordering");
        assert_eq!(ordering.weigh(&replicas[0], &ctx).expect("Weigh replica"), 0.0);

        let ordering = WeightedReplicaOrderingBuilder::default()
            .with_modifier(ScaleModifier(4.0))
            .with_modifier(ScaleModifier(0.5))
            .build()
            .expect("Build ordering");
        assert_eq!(ordering.weigh(&replicas[0], &ctx).expect("Weigh replica"), 2.0);
    }

    #[test]
    fn test_modifier_failure_propagates() {
        let storage = ReplicaStorageProvider::instance();
        let replicas = test_helper::make_replicas(3);
        let ordering = WeightedReplicaOrderingBuilder::default()
            .with_modifier(FailingModifier)
            .with_modifier(GrayListModifier::with_period(Duration::from_secs(60)))
            .build()
            .expect("Build ordering");

        let result = ordering.order(&replicas, &storage, &request(), &RequestParameters::default());
        assert!(matches!(result, Err(OrderingError::Collaborator(_))));

        // The gray list still learns even though the first modifier failed.
        let result = ordering.learn(&test_helper::rejected(&replicas[0]), &storage);
        assert!(result.is_err());
        assert!(GrayListModifier::default()
            .gray_since(&replicas[0], &storage)
            .is_some());
        assert_eq!(ordering.statistics().num_modifier_failures(), 2);
    }

    struct ScaleModifier(f64);

    impl ReplicaWeightModifier for ScaleModifier {
        fn modify(
            &self,
            _replica: &Replica,
            _ctx: &OrderingContext<'_>,
            weight: f64,
        ) -> Result<f64, OrderingError> {
            Ok(weight * self.0)
        }

        fn learn(
            &self,
            _result: &ReplicaResult,
            _storage: &ReplicaStorageProvider,
        ) -> Result<(), OrderingError> {
            Ok(())
        }
    }

    struct FailingModifier;

    impl ReplicaWeightModifier for FailingModifier {
        fn modify(
            &self,
            _replica: &Replica,
            _ctx: &OrderingContext<'_>,
            _weight: f64,
        ) -> Result<f64, OrderingError> {
            Err(OrderingError::Collaborator(anyhow::anyhow!("Modifier is broken.")))
        }

        fn learn(
            &self,
            _result: &ReplicaResult,
            _storage: &ReplicaStorageProvider,
        ) -> Result<(), OrderingError> {
            Err(OrderingError::Collaborator(anyhow::anyhow!("Modifier is broken.")))
        }
    }
}
