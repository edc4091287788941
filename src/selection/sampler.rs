//! Working-set sampling and target selection.
//!
//! The sampler owns its random source so selection is reproducible under a
//! fixed seed. Neither operation mutates the catalog or set it is given.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::core::Item;
use crate::selection::policy::{inverse_mastery_weights, TargetPolicy};
use crate::stats::ScoreTracker;

/// Draws working sets and targets from an injected random source.
#[derive(Debug, Clone)]
pub struct SetSampler<R = ChaCha8Rng> {
    rng: R,
    policy: TargetPolicy,
}

impl SetSampler<ChaCha8Rng> {
    /// Deterministic sampler for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Sampler seeded from the thread RNG.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }
}

impl<R: Rng> SetSampler<R> {
    /// Wrap an existing random source with the uniform target policy.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            policy: TargetPolicy::Uniform,
        }
    }

    /// Use a different target policy.
    pub fn with_policy(mut self, policy: TargetPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active target policy.
    pub fn policy(&self) -> TargetPolicy {
        self.policy
    }

    /// Uniformly draw `size` distinct items without replacement.
    ///
    /// A catalog smaller than `size` yields the whole catalog.
    pub fn pick_working_set(&mut self, catalog: &[Item], size: usize) -> Vec<Item> {
        if catalog.len() < size {
            tracing::debug!(
                available = catalog.len(),
                requested = size,
                "catalog smaller than working set, using all items"
            );
        }

        catalog
            .choose_multiple(&mut self.rng, size)
            .cloned()
            .collect()
    }

    /// Uniformly choose one member of `set`. `None` only for an empty set.
    pub fn pick_target<'a>(&mut self, set: &'a [Item]) -> Option<&'a Item> {
        set.choose(&mut self.rng)
    }

    /// Choose a target according to the active policy.
    pub fn pick_target_with<'a>(
        &mut self,
        set: &'a [Item],
        tracker: &ScoreTracker,
    ) -> Option<&'a Item> {
        match self.policy {
            TargetPolicy::Uniform => self.pick_target(set),
            TargetPolicy::InverseMastery => self.pick_weighted_target(set, tracker),
        }
    }

    /// Choose a target weighted towards weaker items.
    pub fn pick_weighted_target<'a>(
        &mut self,
        set: &'a [Item],
        tracker: &ScoreTracker,
    ) -> Option<&'a Item> {
        let weights = inverse_mastery_weights(set, tracker);
        match WeightedIndex::new(&weights) {
            Ok(dist) => set.get(dist.sample(&mut self.rng)),
            Err(err) => {
                if !set.is_empty() {
                    tracing::warn!(error = %err, "invalid selection weights, using uniform");
                }
                self.pick_target(set)
            }
        }
    }
}
