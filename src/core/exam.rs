//! Exam session state machine for Drill.
//!
//! A session is always awaiting an answer: it holds a working set, a target
//! and the attempt counter. A correct guess (or giving up) closes the round
//! in one step: the outcome is classified, applied to the score tracker, and
//! a new working set and target are drawn with the counter reset. No partial
//! round close is ever observable.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::{Config, ExamConfig};
use crate::core::item::Catalog;
use crate::core::outcome::Outcome;
use crate::core::state::{
    ExamView, GuessResult, RoundRecord, RoundState, SessionSummary, Verdict,
};
use crate::error::{DrillError, Result};
use crate::selection::{SetSampler, TargetPolicy};
use crate::stats::{ScoreTracker, ScoringPolicy};

/// One learner's drill session.
///
/// Owns its catalog copy, score tracker and sampler. All state mutations go
/// through [`submit_guess`](Self::submit_guess) and
/// [`give_up`](Self::give_up).
#[derive(Debug)]
pub struct ExamSession<R = ChaCha8Rng> {
    /// Items to drill.
    catalog: Catalog,
    /// Set size and thresholds.
    config: ExamConfig,
    /// Mastery scores.
    tracker: ScoreTracker,
    /// Random selection of sets and targets.
    sampler: SetSampler<R>,
    /// The live round.
    round: RoundState,
    /// 1-based number of the live round.
    round_number: u64,
    /// Outcome totals.
    summary: SessionSummary,
    /// Closed rounds, oldest first.
    history: Vec<RoundRecord>,
}

impl ExamSession<ChaCha8Rng> {
    /// Build a session from a full configuration.
    ///
    /// Uses `selection.seed` when set, otherwise seeds from the OS.
    pub fn from_config(catalog: Catalog, config: &Config) -> Result<Self> {
        config.validate()?;

        let sampler = match config.selection.seed {
            Some(seed) => SetSampler::seeded(seed),
            None => SetSampler::from_entropy(),
        }
        .with_policy(TargetPolicy::from_config(&config.selection.target_policy));

        let tracker = ScoreTracker::new(ScoringPolicy::from(&config.scoring));

        Self::new(catalog, config.exam.clone(), tracker, sampler)
    }
}

impl<R: Rng> ExamSession<R> {
    /// Create a session and draw its first round.
    pub fn new(
        catalog: Catalog,
        config: ExamConfig,
        tracker: ScoreTracker,
        mut sampler: SetSampler<R>,
    ) -> Result<Self> {
        config.validate()?;
        tracker.policy().validate()?;

        let round = Self::draw_round(&catalog, config.set_size, &tracker, &mut sampler)
            .ok_or_else(|| DrillError::invalid_state("could not draw a first round"))?;

        tracing::debug!(
            items = catalog.len(),
            set_size = config.set_size,
            policy = ?sampler.policy(),
            "exam session started"
        );

        Ok(Self {
            catalog,
            config,
            tracker,
            sampler,
            round,
            round_number: 1,
            summary: SessionSummary::default(),
            history: Vec::new(),
        })
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Submit the learner's choice.
    ///
    /// A candidate whose answer token matches the target's closes the round.
    /// Anything else, including ids outside the working set, counts as a
    /// wrong guess and leaves the round open.
    pub fn submit_guess(&mut self, item_id: &str) -> GuessResult {
        let matched = self
            .round
            .candidate(item_id)
            .map(|candidate| candidate.answers(&self.round.target));

        match matched {
            Some(true) => self.close_round(),
            Some(false) => self.record_miss(item_id, true),
            None => {
                tracing::debug!(
                    guess = item_id,
                    in_catalog = self.catalog.get(item_id).is_some(),
                    "guess outside working set"
                );
                self.record_miss(item_id, false)
            }
        }
    }

    /// Give up on the current target.
    ///
    /// Forces the attempt counter to the give-up threshold and closes the
    /// round, which classifies as a hint.
    pub fn give_up(&mut self) -> GuessResult {
        tracing::debug!(
            item = %self.round.target.id,
            attempts = self.round.attempt_count,
            "learner gave up"
        );
        self.round.attempt_count = self.config.give_up_threshold;
        self.close_round()
    }

    fn record_miss(&mut self, item_id: &str, in_working_set: bool) -> GuessResult {
        self.round.attempt_count = self.round.attempt_count.saturating_add(1);

        tracing::debug!(
            guess = item_id,
            attempts = self.round.attempt_count,
            "incorrect guess"
        );
        if self.round.attempt_count == self.config.reveal_threshold {
            tracing::debug!(item = %self.round.target.id, "reveal unlocked");
        }

        GuessResult {
            verdict: Verdict::Incorrect { in_working_set },
            view: self.view(),
        }
    }

    fn close_round(&mut self) -> GuessResult {
        let attempts = self.round.attempt_count;
        let outcome = Outcome::classify(attempts, self.config.give_up_threshold);
        let closed_target = self.round.target.clone();

        self.tracker.apply_result(&closed_target, outcome);
        let score = self.tracker.current_score();

        self.summary.record(outcome);
        self.history.push(RoundRecord {
            round: self.round_number,
            target_id: closed_target.id.clone(),
            outcome,
            attempts,
            score_after: score,
            closed_at: chrono::Utc::now(),
        });

        tracing::info!(
            round = self.round_number,
            item = %closed_target.id,
            %outcome,
            attempts,
            score,
            "round closed"
        );

        match Self::draw_round(
            &self.catalog,
            self.config.set_size,
            &self.tracker,
            &mut self.sampler,
        ) {
            Some(next) => self.round = next,
            None => {
                // Unreachable for a validated catalog and set size.
                tracing::error!("could not draw a new round, repeating the last one");
                self.round.attempt_count = 0;
            }
        }
        self.round_number += 1;

        GuessResult {
            verdict: Verdict::Correct {
                outcome,
                closed_target,
            },
            view: self.view(),
        }
    }

    /// Draw a working set and target. `None` only if the set came back empty.
    fn draw_round(
        catalog: &Catalog,
        set_size: usize,
        tracker: &ScoreTracker,
        sampler: &mut SetSampler<R>,
    ) -> Option<RoundState> {
        let working_set = sampler.pick_working_set(catalog.items(), set_size);
        let target = sampler.pick_target_with(&working_set, tracker)?.clone();
        let mut round = RoundState::new(working_set, target);

        debug_assert!(
            round.target_in_set(),
            "sampler chose target {} outside the working set",
            round.target.id
        );
        if !Self::restore_target(&mut round, sampler) {
            return None;
        }

        Some(round)
    }

    /// Re-pick the target from the working set if it is not a member.
    /// Returns false only for an empty set.
    fn restore_target(round: &mut RoundState, sampler: &mut SetSampler<R>) -> bool {
        if round.target_in_set() {
            return true;
        }

        tracing::error!(item = %round.target.id, "target outside working set, re-deriving");
        match sampler.pick_target(&round.working_set).cloned() {
            Some(target) => {
                round.target = target;
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Everything the shell needs to render the current state.
    pub fn view(&self) -> ExamView {
        let score = self.tracker.current_score();
        let attempt_count = self.round.attempt_count;

        ExamView {
            round: self.round_number,
            working_set: self.round.working_set.clone(),
            target: self.round.target.clone(),
            attempt_count,
            reveal: self.reveal(),
            score,
            display_score: if attempt_count > 0 { score / 2.0 } else { score },
        }
    }

    /// Whether the shell may highlight the correct choice.
    pub fn reveal(&self) -> bool {
        self.round.attempt_count >= self.config.reveal_threshold
    }

    /// Aggregate mastery.
    pub fn current_score(&self) -> f64 {
        self.tracker.current_score()
    }

    /// The live round.
    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Closed rounds, oldest first.
    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    /// Outcome totals with the current score.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            tracked_items: self.tracker.tracked_items(),
            score: self.tracker.current_score(),
            ..self.summary.clone()
        }
    }
}
