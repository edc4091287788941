//! Round outcomes and the attempt-count classification policy.

use serde::{Deserialize, Serialize};

/// Per-round classification used to update mastery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Correct on the first try.
    Pass,
    /// Correct after one or more wrong guesses.
    Fail,
    /// The learner gave up and had the answer revealed.
    Hint,
}

impl Outcome {
    /// Classify a closing round from its attempt count.
    ///
    /// - `0` → Pass
    /// - exactly `give_up_threshold` → Hint
    /// - anything else → Fail
    ///
    /// Counts above the threshold are reachable when the learner keeps
    /// guessing wrong instead of giving up; those close as Fail.
    pub fn classify(attempt_count: u32, give_up_threshold: u32) -> Self {
        if attempt_count == 0 {
            Outcome::Pass
        } else if attempt_count == give_up_threshold {
            Outcome::Hint
        } else {
            Outcome::Fail
        }
    }

    /// Lower-case name for logs and text output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::Hint => "hint",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_try_is_pass() {
        assert_eq!(Outcome::classify(0, 10), Outcome::Pass);
    }

    #[test]
    fn test_wrong_guesses_below_threshold_fail() {
        assert_eq!(Outcome::classify(1, 10), Outcome::Fail);
        assert_eq!(Outcome::classify(3, 10), Outcome::Fail);
        assert_eq!(Outcome::classify(9, 10), Outcome::Fail);
    }

    #[test]
    fn test_threshold_is_hint() {
        assert_eq!(Outcome::classify(10, 10), Outcome::Hint);
    }

    #[test]
    fn test_past_threshold_fails() {
        assert_eq!(Outcome::classify(11, 10), Outcome::Fail);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Outcome::Hint).unwrap();
        assert_eq!(json, "\"hint\"");
    }

    #[test]
    fn test_display() {
        assert_eq!(Outcome::Pass.to_string(), "pass");
        assert_eq!(Outcome::Fail.to_string(), "fail");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: only zero attempts earns a pass
            #[test]
            fn prop_pass_iff_zero(attempts in 0u32..50, threshold in 1u32..50) {
                let outcome = Outcome::classify(attempts, threshold);
                prop_assert_eq!(outcome == Outcome::Pass, attempts == 0);
            }

            // Property: strictly between zero and the threshold is always a fail
            #[test]
            fn prop_below_threshold_fails(threshold in 2u32..50, frac in 0.0f64..1.0) {
                let attempts = 1 + ((threshold - 1) as f64 * frac) as u32;
                prop_assume!(attempts < threshold);
                prop_assert_eq!(Outcome::classify(attempts, threshold), Outcome::Fail);
            }
        }
    }
}
