//! Core types and logic for Drill.
//!
//! This module contains the drill items and catalog, round outcomes, the
//! observable round state, and the exam session state machine.

pub mod exam;
pub mod item;
pub mod outcome;
pub mod state;

pub use exam::ExamSession;
pub use item::{Catalog, Item};
pub use outcome::Outcome;
pub use state::{ExamView, GuessResult, RoundRecord, RoundState, SessionSummary, Verdict};
