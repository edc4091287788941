//! Configuration loading for Drill.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.drill/config.toml`)
//! 3. User config (`~/.drill/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. A session runs with the classic drill
//! settings (six choices, reveal after three misses, give-up at ten) when no
//! config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DrillError, FailOpen, Result};
use crate::stats::scoring::{weights, ScoringPolicy};

/// Main configuration struct for Drill.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Round structure: set size and attempt thresholds.
    pub exam: ExamConfig,
    /// Mastery score magnitudes and cap shape.
    pub scoring: ScoringConfig,
    /// Target selection policy and randomness.
    pub selection: SelectionConfig,
}

/// Round structure configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExamConfig {
    /// Number of candidate choices shown per round.
    pub set_size: usize,
    /// Attempt count at which a round closes as a hint.
    pub give_up_threshold: u32,
    /// Attempt count at which the shell may highlight the right answer.
    pub reveal_threshold: u32,
}

impl ExamConfig {
    /// Check if a set size is valid (must be >= 1).
    pub fn is_valid_set_size(value: usize) -> bool {
        value >= 1
    }

    /// Check if a threshold is valid (must be >= 1).
    ///
    /// A threshold of 0 would collide with the first-try pass.
    pub fn is_valid_threshold(value: u32) -> bool {
        value >= 1
    }

    /// Validate the whole section.
    pub fn validate(&self) -> Result<()> {
        if !Self::is_valid_set_size(self.set_size) {
            return Err(DrillError::config("exam.set_size must be >= 1"));
        }
        if !Self::is_valid_threshold(self.give_up_threshold) {
            return Err(DrillError::config("exam.give_up_threshold must be >= 1"));
        }
        if !Self::is_valid_threshold(self.reveal_threshold) {
            return Err(DrillError::config("exam.reveal_threshold must be >= 1"));
        }
        Ok(())
    }
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            set_size: 6,
            give_up_threshold: 10,
            reveal_threshold: 3,
        }
    }
}

/// Valid values for the score shape field.
pub const VALID_SHAPES: &[&str] = &["linear", "asymptotic"];

/// Valid values for the target policy field.
pub const VALID_TARGET_POLICIES: &[&str] = &["uniform", "inverse_mastery"];

/// Mastery scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Upper bound for a single item's score.
    pub max_item_score: f64,
    /// Nominal gain for a first-try pass.
    pub pass_points: f64,
    /// Nominal gain for a round closed by giving up.
    pub hint_points: f64,
    /// Loss for a round closed after wrong guesses.
    pub fail_points: f64,
    /// How gains approach the cap: "linear" or "asymptotic".
    pub shape: String,
}

impl ScoringConfig {
    /// Check if a shape value is valid.
    pub fn is_valid_shape(value: &str) -> bool {
        VALID_SHAPES.contains(&value)
    }

    /// Check if a point magnitude is valid (finite and non-negative).
    pub fn is_valid_points(value: f64) -> bool {
        value.is_finite() && value >= 0.0
    }

    /// Validate the whole section.
    pub fn validate(&self) -> Result<()> {
        if !Self::is_valid_shape(&self.shape) {
            return Err(DrillError::config(format!(
                "scoring.shape must be one of {:?}",
                VALID_SHAPES
            )));
        }
        ScoringPolicy::from(self).validate()
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_item_score: weights::MAX_ITEM_SCORE,
            pass_points: weights::PASS_POINTS,
            hint_points: weights::HINT_POINTS,
            fail_points: weights::FAIL_POINTS,
            shape: "asymptotic".to_string(),
        }
    }
}

/// Target selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// "uniform" or "inverse_mastery".
    pub target_policy: String,
    /// Fixed RNG seed. `None` seeds from the OS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SelectionConfig {
    /// Check if a target policy value is valid.
    pub fn is_valid_target_policy(value: &str) -> bool {
        VALID_TARGET_POLICIES.contains(&value)
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            target_policy: "uniform".to_string(),
            seed: None,
        }
    }
}

impl Config {
    /// Load configuration with the full precedence chain for `cwd`.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.drill/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = drill_home()?;
        Self::load_layer(&home.join("config.toml"))
    }

    /// Load project config from `.drill/config.toml` under the project root.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_layer(&project_drill_dir(cwd).join("config.toml"))
    }

    /// Load one layer. A missing file is silent; a broken one is logged.
    fn load_layer(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        Self::load_from_file(path)
            .map(Some)
            .fail_open_with("loading config layer", None)
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| DrillError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| DrillError::config(e.to_string()))
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.exam.validate()?;
        self.scoring.validate()?;
        if !SelectionConfig::is_valid_target_policy(&self.selection.target_policy) {
            return Err(DrillError::config(format!(
                "selection.target_policy must be one of {:?}",
                VALID_TARGET_POLICIES
            )));
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // DRILL_SET_SIZE
        if let Ok(val) = env::var("DRILL_SET_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if ExamConfig::is_valid_set_size(n) => self.exam.set_size = n,
                _ => eprintln!(
                    "Warning: Invalid DRILL_SET_SIZE value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.exam.set_size
                ),
            }
        }

        // DRILL_GIVE_UP_THRESHOLD
        if let Ok(val) = env::var("DRILL_GIVE_UP_THRESHOLD") {
            match val.parse::<u32>() {
                Ok(n) if ExamConfig::is_valid_threshold(n) => self.exam.give_up_threshold = n,
                _ => eprintln!(
                    "Warning: Invalid DRILL_GIVE_UP_THRESHOLD value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.exam.give_up_threshold
                ),
            }
        }

        // DRILL_REVEAL_THRESHOLD
        if let Ok(val) = env::var("DRILL_REVEAL_THRESHOLD") {
            match val.parse::<u32>() {
                Ok(n) if ExamConfig::is_valid_threshold(n) => self.exam.reveal_threshold = n,
                _ => eprintln!(
                    "Warning: Invalid DRILL_REVEAL_THRESHOLD value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.exam.reveal_threshold
                ),
            }
        }

        // DRILL_SCORE_SHAPE
        if let Ok(val) = env::var("DRILL_SCORE_SHAPE") {
            if ScoringConfig::is_valid_shape(&val) {
                self.scoring.shape = val;
            } else {
                eprintln!(
                    "Warning: Invalid DRILL_SCORE_SHAPE value '{}'. \
                    Valid values: {:?}. Using default '{}'.",
                    val, VALID_SHAPES, self.scoring.shape
                );
            }
        }

        // DRILL_TARGET_POLICY
        if let Ok(val) = env::var("DRILL_TARGET_POLICY") {
            if SelectionConfig::is_valid_target_policy(&val) {
                self.selection.target_policy = val;
            } else {
                eprintln!(
                    "Warning: Invalid DRILL_TARGET_POLICY value '{}'. \
                    Valid values: {:?}. Using default '{}'.",
                    val, VALID_TARGET_POLICIES, self.selection.target_policy
                );
            }
        }

        // DRILL_SEED
        if let Ok(val) = env::var("DRILL_SEED") {
            match val.parse::<u64>() {
                Ok(n) => self.selection.seed = Some(n),
                Err(_) => eprintln!(
                    "Warning: Invalid DRILL_SEED value '{}'. \
                    Expected an unsigned integer. Ignoring.",
                    val
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Field-by-field: every non-default value in `other` wins. A layer
    /// cannot set a field back to its default over a lower layer's value.
    fn merge(mut self, other: Config) -> Self {
        let default_exam = ExamConfig::default();
        if other.exam.set_size != default_exam.set_size {
            self.exam.set_size = other.exam.set_size;
        }
        if other.exam.give_up_threshold != default_exam.give_up_threshold {
            self.exam.give_up_threshold = other.exam.give_up_threshold;
        }
        if other.exam.reveal_threshold != default_exam.reveal_threshold {
            self.exam.reveal_threshold = other.exam.reveal_threshold;
        }

        let default_scoring = ScoringConfig::default();
        if other.scoring.max_item_score != default_scoring.max_item_score {
            self.scoring.max_item_score = other.scoring.max_item_score;
        }
        if other.scoring.pass_points != default_scoring.pass_points {
            self.scoring.pass_points = other.scoring.pass_points;
        }
        if other.scoring.hint_points != default_scoring.hint_points {
            self.scoring.hint_points = other.scoring.hint_points;
        }
        if other.scoring.fail_points != default_scoring.fail_points {
            self.scoring.fail_points = other.scoring.fail_points;
        }
        if other.scoring.shape != default_scoring.shape {
            self.scoring.shape = other.scoring.shape;
        }

        let default_selection = SelectionConfig::default();
        if other.selection.target_policy != default_selection.target_policy {
            self.selection.target_policy = other.selection.target_policy;
        }
        if other.selection.seed.is_some() {
            self.selection.seed = other.selection.seed;
        }

        self
    }

    /// Save configuration to the project config file.
    ///
    /// Writes `.drill/config.toml` under `cwd`, creating the directory if
    /// needed. Write-then-rename.
    pub fn save_project(&self, cwd: &Path) -> Result<PathBuf> {
        let drill_dir = cwd.join(".drill");

        if !drill_dir.exists() {
            fs::create_dir_all(&drill_dir).map_err(|e| DrillError::storage(&drill_dir, e))?;
        }

        let config_path = drill_dir.join("config.toml");

        let content =
            toml::to_string_pretty(self).map_err(|e| DrillError::config(e.to_string()))?;

        let temp_path = drill_dir.join(".config.toml.tmp");
        fs::write(&temp_path, &content).map_err(|e| DrillError::storage(&temp_path, e))?;

        let file = fs::File::open(&temp_path).map_err(|e| DrillError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| DrillError::storage(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &config_path).map_err(|e| DrillError::storage(&config_path, e))?;

        Ok(config_path)
    }
}

/// Get the Drill home directory.
///
/// Checks `DRILL_HOME` first, then falls back to `~/.drill`. An empty
/// `DRILL_HOME` is ignored.
pub fn drill_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("DRILL_HOME") {
        if home.is_empty() {
            tracing::warn!("DRILL_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("DRILL_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    dirs::home_dir().map(|home| home.join(".drill"))
}

/// Find the project root: the nearest ancestor holding a `.drill/`
/// directory, or `cwd` itself.
pub fn find_project_root(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .find(|ancestor| ancestor.join(".drill").is_dir())
        .unwrap_or(cwd)
        .to_path_buf()
}

/// Get the project `.drill/` directory for a working directory.
pub fn project_drill_dir(cwd: &Path) -> PathBuf {
    find_project_root(cwd).join(".drill")
}
