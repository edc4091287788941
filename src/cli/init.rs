//! Init command for Drill.
//!
//! Writes a default project configuration to `.drill/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Options for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Force overwrite existing files.
    pub force: bool,
}

/// Output format for the init command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitOutput {
    /// Whether initialization was successful.
    pub success: bool,
    /// Files created (or overwritten).
    pub created: Vec<String>,
    /// Files that already existed (skipped).
    pub skipped: Vec<String>,
    /// Error message if initialization failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InitOutput {
    /// Create a successful output.
    pub fn success(created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: true,
            created,
            skipped,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            created: Vec::new(),
            skipped: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The init command implementation.
pub struct InitCommand {
    cwd: PathBuf,
}

impl InitCommand {
    /// Create a new init command.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    /// Run the init command.
    pub fn run(&self, options: &InitOptions) -> InitOutput {
        let config_path = self.cwd.join(".drill").join("config.toml");

        if config_path.exists() && !options.force {
            return InitOutput::success(Vec::new(), vec![config_path.display().to_string()]);
        }

        match Config::default().save_project(&self.cwd) {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "wrote default config");
                InitOutput::success(vec![path.display().to_string()], Vec::new())
            }
            Err(e) => InitOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &InitOutput, options: &InitOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &InitOutput) -> String {
        if !output.success {
            return format!(
                "Init failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();

        if !output.created.is_empty() {
            lines.push("Created:".to_string());
            for path in &output.created {
                lines.push(format!("  {}", path));
            }
        }

        if !output.skipped.is_empty() {
            lines.push("Already exists (skipped, use --force to overwrite):".to_string());
            for path in &output.skipped {
                lines.push(format!("  {}", path));
            }
        }

        lines.join("\n") + "\n"
    }
}
