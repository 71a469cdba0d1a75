mod adaptive_health;
mod gray_list;
mod leadership;
mod tuning;

pub use adaptive_health::{AdaptiveHealthModifier, Health, HealthSettings};
pub use gray_list::{
    DynamicGrayPeriodProvider,
    FixedGrayPeriodProvider,
    GrayListModifier,
    GrayPeriodProvider,
};
pub use leadership::{
    AcceptedVerdictLeaderDetector,
    AcceptedVerdictOr503LeaderDetector,
    LeaderResultDetector,
    LeadershipModifier,
};
use replicant_model::{Replica, ReplicaResult};
use replicant_storage::ReplicaStorageProvider;
pub use tuning::{
    AdaptiveHealthAction,
    CompositeTuningPolicy,
    ResponseTimeTuningPolicy,
    ResponseVerdictTuningPolicy,
    TuningPolicy,
};

use crate::{OrderingContext, OrderingError};

/// A single scoring rule which adjusts the weight of a replica.
///
/// Modifiers are chained, each one receives the weight produced by the
/// previous modifier and returns the next weight. A modifier only ever
/// writes state in [ReplicaWeightModifier::learn], and only under its own
/// storage key.
pub trait ReplicaWeightModifier: Send + Sync + 'static {
    /// Adjusts the weight of `replica`.
    ///
    /// Missing state must be treated as neutral, i.e. the weight is returned as is.
    fn modify(
        &self,
        replica: &Replica,
        ctx: &OrderingContext<'_>,
        weight: f64,
    ) -> Result<f64, OrderingError>;

    /// Updates the stored state of the result's replica.
    ///
    /// This may be called concurrently for the same replica and must not lose updates.
    fn learn(
        &self,
        result: &ReplicaResult,
        storage: &ReplicaStorageProvider,
    ) -> Result<(), OrderingError>;
}
