use std::iter::FusedIterator;

use rand::rngs::StdRng;
use rand::Rng;
use replicant_model::Replica;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Sampling {
    /// Replicas are yielded in the order they were given.
    AsIs,
    /// Replicas are drawn at random, proportionally to their weight.
    Weighted,
}

/// A lazily drawn order of replicas.
///
/// Every replica given to the ordering is yielded exactly once. Replicas are
/// only drawn when asked for, so a caller which stops after the first replica
/// never pays for ordering the rest.
pub struct ReplicaOrder<R = StdRng> {
    candidates: Vec<(Replica, f64)>,
    sampling: Sampling,
    rng: R,
}

impl<R: Rng> ReplicaOrder<R> {
    /// An order which draws replicas proportionally to their weights.
    ///
    /// Weights must be finite and non-negative.
    pub(crate) fn weighted(candidates: Vec<(Replica, f64)>, rng: R) -> Self {
        debug_assert!(candidates
            .iter()
            .all(|(_, weight)| weight.is_finite() && *weight >= 0.0));

        Self {
            candidates,
            sampling: Sampling::Weighted,
            rng,
        }
    }

    /// An order which yields replicas exactly as given.
    pub(crate) fn as_is(replicas: &[Replica], rng: R) -> Self {
        // Stored in reverse so each step is a cheap pop from the back.
        let candidates = replicas
            .iter()
            .rev()
            .map(|replica| (replica.clone(), 1.0))
            .collect();

        Self {
            candidates,
            sampling: Sampling::AsIs,
            rng,
        }
    }

    /// The weights of the replicas which have not been drawn yet.
    ///
    /// An as-is order reports them in the order they will be yielded, a weighted
    /// order in no particular order.
    pub fn remaining(&self) -> Box<dyn Iterator<Item = (&Replica, f64)> + '_> {
        let candidates = self
            .candidates
            .iter()
            .map(|(replica, weight)| (replica, *weight));

        match self.sampling {
            Sampling::AsIs => Box::new(candidates.rev()),
            Sampling::Weighted => Box::new(candidates),
        }
    }

    fn select_index(&mut self) -> usize {
        let last = self.candidates.len() - 1;

        if self.sampling == Sampling::AsIs || last == 0 {
            return last;
        }

        let total = self
            .candidates
            .iter()
            .map(|(_, weight)| *weight)
            .sum::<f64>();

        if !(total > 0.0 && total.is_finite()) {
            trace!(
                num_candidates = self.candidates.len(),
                "All remaining weights are zero, falling back to a uniform draw."
            );
            return self.rng.gen_range(0..=last);
        }

        let mut point = self.rng.gen::<f64>() * total;
        for (idx, (_, weight)) in self.candidates.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }

            if point < *weight {
                return idx;
            }

            point -= *weight;
        }

        // Rounding can leave the point just past the last bucket.
        self.candidates
            .iter()
            .rposition(|(_, weight)| *weight > 0.0)
            .unwrap_or(last)
    }
}

impl<R: Rng> Iterator for ReplicaOrder<R> {
    type Item = Replica;

    fn next(&mut self) -> Option<Self::Item> {
        if self.candidates.is_empty() {
            return None;
        }

        let idx = self.select_index();
        let (replica, weight) = self.candidates.swap_remove(idx);

        trace!(replica = %replica, weight = weight, "Replica drawn from order.");

        Some(replica)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.candidates.len(), Some(self.candidates.len()))
    }
}

impl<R: Rng> ExactSizeIterator for ReplicaOrder<R> {}

impl<R: Rng> FusedIterator for ReplicaOrder<R> {}

impl<R> std::fmt::Debug for ReplicaOrder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicaOrder")
            .field("sampling", &self.sampling)
            .field("remaining", &self.candidates.len())
            .finish()
    }
}
