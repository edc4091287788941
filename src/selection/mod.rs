//! Working-set sampling and target selection.
//!
//! The sampler draws each round's candidate set from the catalog and picks
//! the target from that set, either uniformly or weighted towards items the
//! learner has not mastered yet.

pub mod policy;
pub mod sampler;

pub use policy::{inverse_mastery_weights, TargetPolicy, MASTERED_WEIGHT_FLOOR};
pub use sampler::SetSampler;
