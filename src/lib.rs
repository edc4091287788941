//! Drill - identification drills with mastery tracking
//!
//! Drill runs "pick the right one" exercises: a random working set is drawn
//! from a catalog, one member is the target, and the learner guesses until
//! they find it or give up. Each closed round feeds a per-item mastery score.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod selection;
pub mod stats;

pub use config::Config;
pub use core::{
    Catalog, ExamSession, ExamView, GuessResult, Item, Outcome, RoundRecord, RoundState,
    SessionSummary, Verdict,
};
pub use error::{DrillError, Result};
pub use selection::{SetSampler, TargetPolicy};
pub use stats::{weights, ScoreShape, ScoreTracker, ScoringPolicy};

// CLI commands
pub use cli::{CatalogCommand, InitCommand, RunCommand};
