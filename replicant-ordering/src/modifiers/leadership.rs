use std::sync::Arc;

use replicant_model::{Replica, ReplicaResult, ResponseCode};
use replicant_storage::{ReplicaStorageProvider, StorageKey};

use crate::{OrderingContext, OrderingError, ReplicaWeightModifier};

static DEFAULT_STORAGE_KEY: &str = "replicant.leadership";

/// Classifies a result as coming from the cluster leader or not.
pub trait LeaderResultDetector: Send + Sync + 'static {
    fn is_leader_result(&self, result: &ReplicaResult) -> bool;
}

#[derive(Debug, Copy, Clone, Default)]
/// Only the leader accepts requests.
pub struct AcceptedVerdictLeaderDetector;

impl LeaderResultDetector for AcceptedVerdictLeaderDetector {
    fn is_leader_result(&self, result: &ReplicaResult) -> bool {
        result.verdict().is_accept()
    }
}

#[derive(Debug, Copy, Clone, Default)]
/// The leader either accepts requests or is temporarily overloaded.
///
/// Reservists answer with anything else, so a `503` still marks the leader.
pub struct AcceptedVerdictOr503LeaderDetector;

impl LeaderResultDetector for AcceptedVerdictOr503LeaderDetector {
    fn is_leader_result(&self, result: &ReplicaResult) -> bool {
        result.verdict().is_accept()
            || result.code() == ResponseCode::SERVICE_UNAVAILABLE
    }
}

/// Models a cluster with a single leader and many reservists.
///
/// Every replica is a reservist until one of its results is detected as
/// coming from the leader, reservists have their weight forced to zero so
/// they are only tried once every known leader has been tried.
pub struct LeadershipModifier {
    detector: Arc<dyn LeaderResultDetector>,
    storage_key: StorageKey,
}

impl LeadershipModifier {
    pub fn new(detector: impl LeaderResultDetector) -> Self {
        Self {
            detector: Arc::new(detector),
            storage_key: StorageKey::Borrowed(DEFAULT_STORAGE_KEY),
        }
    }

    /// Set the key the leadership flags are stored under.
    pub fn with_storage_key(mut self, key: impl Into<StorageKey>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[inline]
    pub fn storage_key(&self) -> &str {
        self.storage_key.as_ref()
    }

    /// Returns if the replica is currently believed to be the leader.
    pub fn is_leader(&self, replica: &Replica, storage: &ReplicaStorageProvider) -> bool {
        storage
            .obtain::<bool>(self.storage_key.clone())
            .get(replica)
            .unwrap_or(false)
    }
}

impl Default for LeadershipModifier {
    fn default() -> Self {
        Self::new(AcceptedVerdictLeaderDetector)
    }
}

impl ReplicaWeightModifier for LeadershipModifier {
    fn modify(
        &self,
        replica: &Replica,
        ctx: &OrderingContext<'_>,
        weight: f64,
    ) -> Result<f64, OrderingError> {
        if self.is_leader(replica, ctx.storage) {
            Ok(weight)
        } else {
            Ok(0.0)
        }
    }

    fn learn(
        &self,
        result: &ReplicaResult,
        storage: &ReplicaStorageProvider,
    ) -> Result<(), OrderingError> {
        let replica = result.replica();
        let is_leader = self.detector.is_leader_result(result);
        let flags = storage.obtain::<bool>(self.storage_key.clone());

        loop {
            let changed = match flags.get(replica) {
                Some(current) if current == is_leader => return Ok(()),
                Some(current) => flags.try_update(replica, is_leader, &current),
                // A missing flag already means reservist.
                None if !is_leader => return Ok(()),
                None => flags.try_add(replica.clone(), true),
            };

            if changed {
                if is_leader {
                    info!(replica = %replica, "Replica has been promoted to leader.");
                } else {
                    info!(replica = %replica, "Replica is no longer the leader.");
                }
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use replicant_model::{Request, RequestParameters, Verdict};

    use super::*;

    fn modify(
        modifier: &LeadershipModifier,
        replica: &Replica,
        storage: &ReplicaStorageProvider,
    ) -> f64 {
        let request = Request::get("/".parse().unwrap());
        let parameters = RequestParameters::default();
        let replicas = [replica.clone()];
        let ctx = OrderingContext {
            replicas: &replicas,
            storage,
            request: &request,
            parameters: &parameters,
        };
        modifier.modify(replica, &ctx, 1.0).expect("Modify weight")
    }

    #[test]
    fn test_replicas_start_as_reservists() {
        let modifier = LeadershipModifier::default();
        let storage = ReplicaStorageProvider::instance();
        let replica = test_helper::make_replica(0);

        assert_eq!(modify(&modifier, &replica, &storage), 0.0);

        modifier
            .learn(&test_helper::rejected(&replica), &storage)
            .expect("Learn result");
        assert_eq!(modify(&modifier, &replica, &storage), 0.0);
        assert!(
            storage.obtain::<bool>(modifier.storage_key().to_string()).is_empty(),
            "Non-leader results for unknown replicas should not be written."
        );
    }

    #[test]
    fn test_leadership_flips() {
        let modifier = LeadershipModifier::default();
        let storage = ReplicaStorageProvider::instance();
        let replica = test_helper::make_replica(0);

        modifier
            .learn(&test_helper::accepted(&replica), &storage)
            .expect("Learn result");
        assert!(modifier.is_leader(&replica, &storage));
        assert_eq!(modify(&modifier, &replica, &storage), 1.0);
        assert_eq!(modify(&modifier, &replica, &storage), 1.0);

        modifier
            .learn(&test_helper::accepted(&replica), &storage)
            .expect("Learn result");
        assert!(modifier.is_leader(&replica, &storage));

        modifier
            .learn(&test_helper::rejected(&replica), &storage)
            .expect("Learn result");
        assert!(!modifier.is_leader(&replica, &storage));
        assert_eq!(modify(&modifier, &replica, &storage), 0.0);
    }

    #[test]
    fn test_503_detector() {
        let modifier = LeadershipModifier::new(AcceptedVerdictOr503LeaderDetector);
        let storage = ReplicaStorageProvider::instance();
        let replica = test_helper::make_replica(0);

        let overloaded = test_helper::result_with(
            &replica,
            ResponseCode::SERVICE_UNAVAILABLE,
            Verdict::Reject,
            Duration::from_millis(5),
        );
        modifier.learn(&overloaded, &storage).expect("Learn result");
        assert!(modifier.is_leader(&replica, &storage));

        let failed = test_helper::result_with(
            &replica,
            ResponseCode::CONNECT_FAILURE,
            Verdict::Reject,
            Duration::from_millis(5),
        );
        modifier.learn(&failed, &storage).expect("Learn result");
        assert!(!modifier.is_leader(&replica, &storage));
    }
}
