//! Mastery scoring policy for Drill.
//!
//! Turns a round outcome into a new per-item score. Every score lives in
//! `[0, max_item_score]`.
//!
//! Default magnitudes:
//! - Pass: +2.0
//! - Hint: +0.5
//! - Fail: -1.0
//!
//! With the asymptotic shape, gains are scaled by the remaining headroom
//! `1 - score / max`, so repeated passes approach the cap without reaching
//! it in a fixed number of steps. With the linear shape, gains are added
//! whole and clamped at the cap. Losses are never scaled.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::core::Outcome;
use crate::error::{DrillError, Result};

/// Default score magnitudes.
pub mod weights {
    /// Per-item score cap.
    pub const MAX_ITEM_SCORE: f64 = 10.0;
    /// Gain for a first-try pass.
    pub const PASS_POINTS: f64 = 2.0;
    /// Gain for a round closed by giving up.
    pub const HINT_POINTS: f64 = 0.5;
    /// Loss for a round closed after wrong guesses.
    pub const FAIL_POINTS: f64 = 1.0;
}

/// How gains approach the per-item cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreShape {
    /// Full gain, clamped at the cap.
    Linear,
    /// Gain scaled by remaining headroom.
    #[default]
    Asymptotic,
}

impl ScoreShape {
    /// Parse a config value. Unknown values fall back to asymptotic.
    pub fn from_config(value: &str) -> Self {
        match value {
            "linear" => ScoreShape::Linear,
            "asymptotic" => ScoreShape::Asymptotic,
            other => {
                tracing::warn!(shape = other, "unknown score shape, using asymptotic");
                ScoreShape::Asymptotic
            }
        }
    }
}

/// Named scoring magnitudes and cap shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringPolicy {
    /// Per-item cap.
    pub max_item_score: f64,
    /// Nominal pass gain.
    pub pass_points: f64,
    /// Nominal hint gain.
    pub hint_points: f64,
    /// Fail loss.
    pub fail_points: f64,
    /// Cap shape.
    pub shape: ScoreShape,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            max_item_score: weights::MAX_ITEM_SCORE,
            pass_points: weights::PASS_POINTS,
            hint_points: weights::HINT_POINTS,
            fail_points: weights::FAIL_POINTS,
            shape: ScoreShape::Asymptotic,
        }
    }
}

impl From<&ScoringConfig> for ScoringPolicy {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            max_item_score: config.max_item_score,
            pass_points: config.pass_points,
            hint_points: config.hint_points,
            fail_points: config.fail_points,
            shape: ScoreShape::from_config(&config.shape),
        }
    }
}

impl ScoringPolicy {
    /// Reject magnitudes that would produce NaN or out-of-order scores.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_item_score.is_finite() && self.max_item_score > 0.0) {
            return Err(DrillError::config("scoring.max_item_score must be > 0"));
        }
        for (name, value) in [
            ("pass_points", self.pass_points),
            ("hint_points", self.hint_points),
            ("fail_points", self.fail_points),
        ] {
            if !ScoringConfig::is_valid_points(value) {
                return Err(DrillError::config(format!(
                    "scoring.{} must be finite and >= 0",
                    name
                )));
            }
        }
        if self.pass_points <= self.hint_points {
            return Err(DrillError::config(
                "scoring.pass_points must exceed scoring.hint_points",
            ));
        }
        Ok(())
    }

    /// Compute the score that follows `current` after `outcome`.
    ///
    /// The result is always within `[0, max_item_score]`.
    pub fn next_score(&self, current: f64, outcome: Outcome) -> f64 {
        let current = current.clamp(0.0, self.max_item_score);

        let next = match outcome {
            Outcome::Pass => current + self.gain(current, self.pass_points),
            Outcome::Hint => current + self.gain(current, self.hint_points),
            Outcome::Fail => current - self.fail_points,
        };

        next.clamp(0.0, self.max_item_score)
    }

    fn gain(&self, current: f64, points: f64) -> f64 {
        match self.shape {
            ScoreShape::Linear => points,
            ScoreShape::Asymptotic => points * (1.0 - current / self.max_item_score),
        }
    }
}
