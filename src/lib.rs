//! # Replicant
//! The decision layer of a cluster client: which replica to try next, and how long
//! to wait before trying another one in parallel.
//!
//! This is a convenience package which includes all of the sub-projects within
//! Replicant, realistically you probably only want some of these projects:
//!
//! ### Features
//! - `replicant_model` - Replicas, requests, responses, verdicts and time budgets.
//! - `replicant_storage` - Per-replica state shared between modifiers and clients.
//! - `replicant_ordering` - Weighted replica ordering with gray-listing, leadership
//!   and adaptive health.
//! - `replicant_forking` - Forking delays and wait-another-result decisions.

#[cfg(feature = "replicant-forking")]
pub use replicant_forking as forking;
#[cfg(feature = "replicant-model")]
pub use replicant_model as model;
#[cfg(feature = "replicant-ordering")]
pub use replicant_ordering as ordering;
#[cfg(feature = "replicant-storage")]
pub use replicant_storage as storage;
