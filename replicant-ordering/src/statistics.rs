use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type Counter = AtomicU64;

#[derive(Debug, Clone, Default)]
/// Live metrics of a weighted replica ordering.
pub struct OrderingStatistics(Arc<OrderingStatisticsInner>);

impl Deref for OrderingStatistics {
    type Target = OrderingStatisticsInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Default)]
pub struct OrderingStatisticsInner {
    /// The number of orders which have been produced.
    pub(crate) num_orders: Counter,
    /// The number of replicas whose final weight was zero when an order was produced.
    pub(crate) num_zero_weight_replicas: Counter,
    /// The number of results which have been learned from.
    pub(crate) num_learned_results: Counter,
    /// The number of times a modifier failed while computing weights or learning.
    pub(crate) num_modifier_failures: Counter,
}

impl OrderingStatisticsInner {
    /// The number of orders which have been produced.
    pub fn num_orders(&self) -> u64 {
        self.num_orders.load(Ordering::Relaxed)
    }

    /// The number of replicas whose final weight was zero when an order was produced.
    pub fn num_zero_weight_replicas(&self) -> u64 {
        self.num_zero_weight_replicas.load(Ordering::Relaxed)
    }

    /// The number of results which have been learned from.
    pub fn num_learned_results(&self) -> u64 {
        self.num_learned_results.load(Ordering::Relaxed)
    }

    /// The number of times a modifier failed while computing weights or learning.
    pub fn num_modifier_failures(&self) -> u64 {
        self.num_modifier_failures.load(Ordering::Relaxed)
    }
}
