//! Round state and the observable values a session hands to its shell.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Item, Outcome};

/// Live state of the current round.
///
/// `attempt_count` counts wrong guesses since `target` was chosen and is
/// reset to 0 exactly when a new target is chosen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundState {
    /// Candidate choices for this round.
    pub working_set: Vec<Item>,
    /// The item to identify. Always a member of `working_set`.
    pub target: Item,
    /// Wrong guesses so far this round.
    pub attempt_count: u32,
}

impl RoundState {
    /// Start a fresh round.
    pub fn new(working_set: Vec<Item>, target: Item) -> Self {
        Self {
            working_set,
            target,
            attempt_count: 0,
        }
    }

    /// Whether the target is one of the candidates.
    pub fn target_in_set(&self) -> bool {
        self.working_set.iter().any(|item| item.id == self.target.id)
    }

    /// Find a candidate by id.
    pub fn candidate(&self, id: &str) -> Option<&Item> {
        self.working_set.iter().find(|item| item.id == id)
    }
}

/// Snapshot of everything the shell needs to render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExamView {
    /// 1-based number of the current round.
    pub round: u64,
    /// Candidate choices.
    pub working_set: Vec<Item>,
    /// The item to identify.
    pub target: Item,
    /// Wrong guesses so far this round.
    pub attempt_count: u32,
    /// Whether the shell may highlight the correct choice.
    pub reveal: bool,
    /// Stored aggregate mastery.
    pub score: f64,
    /// Aggregate as shown to the learner: halved while the current round
    /// has wrong guesses.
    pub display_score: f64,
}

/// How a single guess was judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The guess matched; the round closed with this outcome.
    Correct {
        /// Outcome applied to the closed round's target.
        outcome: Outcome,
        /// The target that was just closed.
        closed_target: Item,
    },
    /// The guess did not match; the round stays open.
    Incorrect {
        /// Whether the guessed id was one of the candidates.
        in_working_set: bool,
    },
}

impl Verdict {
    /// Whether the guess closed the round.
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct { .. })
    }

    /// The closing outcome, if the round closed.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Verdict::Correct { outcome, .. } => Some(*outcome),
            Verdict::Incorrect { .. } => None,
        }
    }
}

/// Result of a transition: the verdict plus the new observable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessResult {
    /// How the action was judged.
    #[serde(flatten)]
    pub verdict: Verdict,
    /// State after the action.
    pub view: ExamView,
}

/// A closed round, kept for the session summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundRecord {
    /// 1-based round number.
    pub round: u64,
    /// Id of the round's target.
    pub target_id: String,
    /// Outcome applied on close.
    pub outcome: Outcome,
    /// Attempt count at close.
    pub attempts: u32,
    /// Aggregate mastery after the outcome was applied.
    pub score_after: f64,
    /// When the round closed.
    pub closed_at: DateTime<Utc>,
}

/// Totals for a session so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    /// Closed rounds.
    pub rounds: u64,
    /// Rounds closed on the first try.
    pub passes: u64,
    /// Rounds closed after wrong guesses.
    pub fails: u64,
    /// Rounds closed by giving up.
    pub hints: u64,
    /// Items that have a mastery score.
    pub tracked_items: usize,
    /// Current aggregate mastery.
    pub score: f64,
}

impl SessionSummary {
    /// Count one closed round.
    pub fn record(&mut self, outcome: Outcome) {
        self.rounds += 1;
        match outcome {
            Outcome::Pass => self.passes += 1,
            Outcome::Fail => self.fails += 1,
            Outcome::Hint => self.hints += 1,
        }
    }

    /// Share of closed rounds passed on the first try.
    pub fn pass_rate(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.passes as f64 / self.rounds as f64
        }
    }
}
