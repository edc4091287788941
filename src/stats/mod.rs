//! Mastery scoring for Drill.
//!
//! The scoring policy maps an item's current score and a round outcome to
//! its next score. The tracker owns per-item scores for one session and
//! exposes the aggregate.

pub mod scoring;
pub mod tracker;

pub use scoring::{weights, ScoreShape, ScoringPolicy};
pub use tracker::ScoreTracker;
