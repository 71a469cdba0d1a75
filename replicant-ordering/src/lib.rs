//! # Replicant Ordering
//!
//! Decides the order replicas should be contacted in, and learns from the
//! outcome of every attempt so that future orders favour healthy replicas.
//!
//! Every replica starts with a base weight which is passed through a fixed chain
//! of [ReplicaWeightModifier]s. The resulting weights drive a weighted random
//! draw without replacement, producing a [ReplicaOrder] lazily, one replica at a time.
//!
//! ### Basic Example
//! ```rust
//! use std::time::Duration;
//! use replicant_model::{Replica, Request, RequestParameters};
//! use replicant_ordering::{GrayListModifier, ReplicaOrdering, WeightedReplicaOrderingBuilder};
//! use replicant_storage::ReplicaStorageProvider;
//!
//! let ordering = WeightedReplicaOrderingBuilder::default()
//!     .with_modifier(GrayListModifier::with_period(Duration::from_secs(60)))
//!     .build()
//!     .expect("Valid ordering settings.");
//!
//! let storage = ReplicaStorageProvider::instance();
//! let replicas = vec![
//!     Replica::from_static("http://replica-1:80/"),
//!     Replica::from_static("http://replica-2:80/"),
//! ];
//! let request = Request::get("/status".parse().unwrap());
//!
//! let order = ordering
//!     .order(&replicas, &storage, &request, &RequestParameters::default())
//!     .expect("Order replicas.");
//! assert_eq!(order.count(), 2);
//! ```

#[macro_use]
extern crate tracing;

mod error;
mod modifiers;
mod order;
mod ordering;
mod statistics;

pub use error::{ConfigError, OrderingError};
pub use modifiers::{
    AcceptedVerdictLeaderDetector,
    AcceptedVerdictOr503LeaderDetector,
    AdaptiveHealthAction,
    AdaptiveHealthModifier,
    CompositeTuningPolicy,
    DynamicGrayPeriodProvider,
    FixedGrayPeriodProvider,
    GrayListModifier,
    GrayPeriodProvider,
    Health,
    HealthSettings,
    LeaderResultDetector,
    LeadershipModifier,
    ReplicaWeightModifier,
    ResponseTimeTuningPolicy,
    ResponseVerdictTuningPolicy,
    TuningPolicy,
};
pub use order::ReplicaOrder;
pub use ordering::{
    AsIsReplicaOrdering,
    OrderingContext,
    RandomReplicaOrdering,
    ReplicaOrdering,
    WeightSettings,
    WeightedReplicaOrdering,
    WeightedReplicaOrderingBuilder,
};
pub use statistics::OrderingStatistics;
