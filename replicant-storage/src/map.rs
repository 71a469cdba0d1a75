use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use replicant_model::Replica;

/// A concurrent map from replica to a value.
///
/// Each replica owns its own slot with its own lock, the outer index is only
/// locked for writing when a replica is seen for the first time. This means
/// updates to different replicas never wait on each other, while updates to the
/// same replica are linearizable.
///
/// Removing a value empties the slot rather than dropping it, the number of
/// slots is bounded by the number of distinct replicas ever stored.
pub struct ReplicaMap<V> {
    slots: RwLock<HashMap<Replica, Mutex<Option<V>>>>,
}

impl<V> Default for ReplicaMap<V> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> ReplicaMap<V> {
    /// Runs `op` against the existing slot of the replica, if there is one.
    fn with_existing<T>(
        &self,
        replica: &Replica,
        op: impl FnOnce(&mut Option<V>) -> T,
    ) -> Option<T> {
        let slots = self.slots.read();
        let slot = slots.get(replica)?;
        let mut value = slot.lock();
        Some(op(&mut value))
    }

    /// Runs `op` against the slot of the replica, creating an empty slot first if needed.
    fn with_slot<T>(
        &self,
        replica: &Replica,
        op: impl FnOnce(&mut Option<V>) -> T,
    ) -> T {
        {
            let slots = self.slots.read();
            if let Some(slot) = slots.get(replica) {
                return op(&mut slot.lock());
            }
        }

        let mut slots = self.slots.write();
        let slot = slots.entry(replica.clone()).or_default();
        op(slot.get_mut())
    }

    /// Attempts to store a value for a replica which currently has none.
    ///
    /// Returns `false` if a value is already present.
    pub fn try_add(&self, replica: Replica, value: V) -> bool {
        self.with_slot(&replica, move |slot| {
            if slot.is_some() {
                return false;
            }

            *slot = Some(value);
            true
        })
    }

    /// Atomically updates or inserts the value of a replica.
    ///
    /// `op` is given the current value, if any, and returns the value to store.
    /// Returning `None` leaves the slot as it was.
    pub fn update(
        &self,
        replica: &Replica,
        op: impl FnOnce(Option<&V>) -> Option<V>,
    ) -> bool {
        self.with_slot(replica, |slot| match op(slot.as_ref()) {
            Some(value) => {
                *slot = Some(value);
                true
            },
            None => false,
        })
    }

    /// Removes the value of a replica regardless of what it is.
    pub fn remove(&self, replica: &Replica) -> Option<V> {
        self.with_existing(replica, |slot| slot.take()).flatten()
    }

    /// The number of replicas which currently hold a value.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> ReplicaMap<V> {
    /// Gets a copy of the current value of a replica.
    pub fn get(&self, replica: &Replica) -> Option<V> {
        self.with_existing(replica, |slot| slot.clone()).flatten()
    }

    /// Gets the current value of a replica or stores the one produced by `factory`.
    pub fn get_or_add(&self, replica: &Replica, factory: impl FnOnce() -> V) -> V {
        self.with_slot(replica, |slot| slot.get_or_insert_with(factory).clone())
    }

    /// A point-in-time copy of every stored value.
    pub fn snapshot(&self) -> Vec<(Replica, V)> {
        self.slots
            .read()
            .iter()
            .filter_map(|(replica, slot)| {
                slot.lock().clone().map(|value| (replica.clone(), value))
            })
            .collect()
    }
}

impl<V: PartialEq> ReplicaMap<V> {
    /// Replaces the value of a replica only if it is still equal to `expected`.
    ///
    /// Returns `false` if the value has changed or is missing, in which case
    /// the caller should re-read the value and retry.
    pub fn try_update(&self, replica: &Replica, value: V, expected: &V) -> bool {
        self.with_existing(replica, move |slot| match slot {
            Some(current) if current == expected => {
                *current = value;
                true
            },
            _ => false,
        })
        .unwrap_or(false)
    }

    /// Removes the value of a replica only if it is still equal to `expected`.
    pub fn try_remove(&self, replica: &Replica, expected: &V) -> bool {
        self.with_existing(replica, |slot| {
            if slot.as_ref() == Some(expected) {
                *slot = None;
                true
            } else {
                false
            }
        })
        .unwrap_or(false)
    }
}

impl<V> std::fmt::Debug for ReplicaMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicaMap")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replica(n: u8) -> Replica {
        format!("http://127.0.0.{n}:80/").parse().expect("Parse replica")
    }

    #[test]
    fn test_add_and_get() {
        let map = ReplicaMap::<u64>::default();
        assert!(map.is_empty());
        assert_eq!(map.get(&replica(1)), None);

        assert!(map.try_add(replica(1), 5));
        assert!(!map.try_add(replica(1), 6), "Existing value should not be replaced.");
        assert_eq!(map.get(&replica(1)), Some(5));
        assert_eq!(map.len(), 1);

        assert_eq!(map.get_or_add(&replica(2), || 7), 7);
        assert_eq!(map.get_or_add(&replica(2), || 8), 7);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_compare_and_swap() {
        let map = ReplicaMap::<u64>::default();
        assert!(!map.try_update(&replica(1), 2, &1), "Missing value cannot be swapped.");

        map.try_add(replica(1), 1);
        assert!(!map.try_update(&replica(1), 3, &2));
        assert!(map.try_update(&replica(1), 3, &1));
        assert_eq!(map.get(&replica(1)), Some(3));
    }

    #[test]
    fn test_remove_if_unchanged() {
        let map = ReplicaMap::<u64>::default();
        map.try_add(replica(1), 1);

        assert!(!map.try_remove(&replica(1), &2));
        assert_eq!(map.get(&replica(1)), Some(1));

        assert!(map.try_remove(&replica(1), &1));
        assert_eq!(map.get(&replica(1)), None);
        assert!(map.is_empty());

        // The slot is reusable after removal.
        assert!(map.try_add(replica(1), 4));
        assert_eq!(map.remove(&replica(1)), Some(4));
        assert_eq!(map.remove(&replica(1)), None);
    }

    #[test]
    fn test_update() {
        let map = ReplicaMap::<u64>::default();
        assert!(map.update(&replica(1), |v| Some(v.copied().unwrap_or_default() + 1)));
        assert!(map.update(&replica(1), |v| Some(v.copied().unwrap_or_default() + 1)));
        assert!(!map.update(&replica(1), |_| None));
        assert_eq!(map.get(&replica(1)), Some(2));

        let mut snapshot = map.snapshot();
        snapshot.sort_by_key(|(_, v)| *v);
        assert_eq!(snapshot, vec![(replica(1), 2)]);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let map = ReplicaMap::<u64>::default();
        let num_threads = 8;
        let num_increments = 1_000;

        std::thread::scope(|s| {
            for _ in 0..num_threads {
                s.spawn(|| {
                    for _ in 0..num_increments {
                        loop {
                            let current = map.get_or_add(&replica(1), || 0);
                            if map.try_update(&replica(1), current + 1, &current) {
                                break;
                            }
                        }
                    }
                });
            }
        });

        assert_eq!(map.get(&replica(1)), Some(num_threads * num_increments));
    }
}
