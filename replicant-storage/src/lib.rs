//! # Replicant Storage
//!
//! Per-replica state shared between the weight modifiers of a cluster client.
//!
//! State is namespaced twice: by the value type and by a *storage key* which each
//! modifier picks for itself, so two modifiers never see each other's data even
//! if they happen to store the same type. On top of that a [StorageScope] decides
//! if the state is shared by every client in the process or private to one client.
//!
//! ```rust
//! use replicant_model::Replica;
//! use replicant_storage::ReplicaStorageProvider;
//!
//! let storage = ReplicaStorageProvider::instance();
//! let replica = Replica::from_static("http://replica-1:80/");
//!
//! let flags = storage.obtain::<bool>("my-modifier");
//! assert!(flags.try_add(replica.clone(), true));
//! assert!(flags.try_update(&replica, false, &true));
//! assert_eq!(flags.get(&replica), Some(false));
//! ```

#[macro_use]
extern crate tracing;

mod container;
mod map;
mod provider;

pub use container::{ReplicaStorageContainer, StorageKey};
pub use map::ReplicaMap;
pub use provider::{ReplicaStorageProvider, StorageScope};
