use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::ReplicaMap;

/// The name a modifier stores its state under.
pub type StorageKey = Cow<'static, str>;

type ContainerKey = (TypeId, StorageKey);
type ErasedContainer = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
/// A registry of typed state containers.
///
/// Containers are looked up by their concrete type and a storage key and are
/// created at most once per pair, every caller asking for the same pair gets
/// the same container.
pub struct ReplicaStorageContainer {
    containers: RwLock<HashMap<ContainerKey, ErasedContainer>>,
}

impl ReplicaStorageContainer {
    /// Gets or creates the per-replica map of `V` for the given storage key.
    pub fn obtain<V>(&self, key: impl Into<StorageKey>) -> Arc<ReplicaMap<V>>
    where
        V: Send + 'static,
    {
        self.get_or_create(key.into(), ReplicaMap::<V>::default)
    }

    /// Gets or creates a single shared value of `V` for the given storage key.
    ///
    /// This is used for state which is not tracked per replica.
    pub fn obtain_global<V>(
        &self,
        key: impl Into<StorageKey>,
        factory: impl FnOnce() -> V,
    ) -> Arc<V>
    where
        V: Send + Sync + 'static,
    {
        self.get_or_create(key.into(), factory)
    }

    /// The number of containers which have been created so far.
    pub fn len(&self) -> usize {
        self.containers.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_or_create<T>(&self, key: StorageKey, factory: impl FnOnce() -> T) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        let key = (TypeId::of::<T>(), key);

        {
            let containers = self.containers.read();
            if let Some(container) = lookup::<T>(&containers, &key) {
                return container;
            }
        }

        let mut containers = self.containers.write();

        // Someone may have beaten us to it while we waited for the write lock.
        if let Some(container) = lookup::<T>(&containers, &key) {
            return container;
        }

        trace!(
            storage_key = %key.1,
            value_type = type_name::<T>(),
            "Creating new storage container."
        );

        let container = Arc::new(factory());
        containers.insert(key, container.clone());
        container
    }
}

fn lookup<T>(
    containers: &HashMap<ContainerKey, ErasedContainer>,
    key: &ContainerKey,
) -> Option<Arc<T>>
where
    T: Send + Sync + 'static,
{
    containers
        .get(key)
        .cloned()
        .and_then(|container| container.downcast::<T>().ok())
}

impl std::fmt::Debug for ReplicaStorageContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicaStorageContainer")
            .field("num_containers", &self.len())
            .finish()
    }
}
