use std::sync::{Arc, OnceLock};

use crate::{ReplicaMap, ReplicaStorageContainer, StorageKey};

/// The container shared by every client created with [StorageScope::Process].
///
/// It is created on first use and lives until the process exits.
static PROCESS_CONTAINER: OnceLock<Arc<ReplicaStorageContainer>> = OnceLock::new();

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
/// Who can see the replica state a client learns.
pub enum StorageScope {
    #[default]
    /// All clients in the process share the same state.
    ///
    /// This is useful when several clients talk to the same physical cluster,
    /// a replica which failed for one of them is avoided by all of them.
    Process,
    /// Every client gets a fresh, private state.
    Instance,
}

#[derive(Clone)]
/// Hands out replica state containers for a given scope.
///
/// The API is the same regardless of scope, so the modifiers using it never
/// need to know which one they are running in.
pub struct ReplicaStorageProvider {
    scope: StorageScope,
    container: Arc<ReplicaStorageContainer>,
}

impl ReplicaStorageProvider {
    /// Creates a new provider for the given scope.
    pub fn new(scope: StorageScope) -> Self {
        let container = match scope {
            StorageScope::Process => PROCESS_CONTAINER
                .get_or_init(|| {
                    debug!("Initialising process wide replica storage.");
                    Arc::new(ReplicaStorageContainer::default())
                })
                .clone(),
            StorageScope::Instance => Arc::new(ReplicaStorageContainer::default()),
        };

        Self { scope, container }
    }

    #[inline]
    /// A provider backed by the process wide container.
    pub fn process() -> Self {
        Self::new(StorageScope::Process)
    }

    #[inline]
    /// A provider backed by a new, private container.
    pub fn instance() -> Self {
        Self::new(StorageScope::Instance)
    }

    #[inline]
    pub fn scope(&self) -> StorageScope {
        self.scope
    }

    #[inline]
    /// Gets or creates the per-replica map of `V` for the given storage key.
    pub fn obtain<V>(&self, key: impl Into<StorageKey>) -> Arc<ReplicaMap<V>>
    where
        V: Send + 'static,
    {
        self.container.obtain(key)
    }

    #[inline]
    /// Gets or creates a single shared value of `V` for the given storage key.
    pub fn obtain_global<V>(
        &self,
        key: impl Into<StorageKey>,
        factory: impl FnOnce() -> V,
    ) -> Arc<V>
    where
        V: Send + Sync + 'static,
    {
        self.container.obtain_global(key, factory)
    }

    #[inline]
    /// Returns if both providers read and write the same state.
    pub fn shares_state_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.container, &other.container)
    }
}

impl Default for ReplicaStorageProvider {
    fn default() -> Self {
        Self::new(StorageScope::default())
    }
}

impl std::fmt::Debug for ReplicaStorageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicaStorageProvider")
            .field("scope", &self.scope)
            .finish()
    }
}
