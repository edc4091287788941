//! Target selection policies.
//!
//! The classic drill picks the target uniformly from the freshly drawn
//! working set. The inverse-mastery policy weights each candidate by how far
//! it is from the score cap, so weaker items come up more often while
//! mastered items keep a small chance.

use serde::{Deserialize, Serialize};

use crate::core::Item;
use crate::stats::ScoreTracker;

/// Weight kept by a fully mastered item under inverse-mastery selection.
pub const MASTERED_WEIGHT_FLOOR: f64 = 0.5;

/// How the next target is chosen from the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPolicy {
    /// Every member of the set is equally likely.
    #[default]
    Uniform,
    /// Members are weighted by `max_item_score - score + floor`.
    InverseMastery,
}

impl TargetPolicy {
    /// Parse a config value. Unknown values fall back to uniform.
    pub fn from_config(value: &str) -> Self {
        match value {
            "uniform" => TargetPolicy::Uniform,
            "inverse_mastery" => TargetPolicy::InverseMastery,
            other => {
                tracing::warn!(policy = other, "unknown target policy, using uniform");
                TargetPolicy::Uniform
            }
        }
    }
}

/// Selection weights for `set` under the inverse-mastery policy.
///
/// Always strictly positive, so every member stays selectable.
pub fn inverse_mastery_weights(set: &[Item], tracker: &ScoreTracker) -> Vec<f64> {
    let max = tracker.policy().max_item_score;
    set.iter()
        .map(|item| (max - tracker.item_score(&item.id)).max(0.0) + MASTERED_WEIGHT_FLOOR)
        .collect()
}
