//! Catalog command for Drill.
//!
//! Lists the items a session would drill.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Catalog, Item};
use crate::error::Result;

/// Load the catalog at `path`, or the built-in alphabet when none is given.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => Catalog::load_from_file(path),
        None => Ok(Catalog::alphabet()),
    }
}

/// Options for the catalog command.
#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the catalog command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOutput {
    /// Whether the catalog loaded.
    pub success: bool,
    /// Where the catalog came from.
    pub source: String,
    /// Items in catalog order.
    pub items: Vec<Item>,
    /// Error message if loading failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CatalogOutput {
    /// Create a successful output.
    pub fn success(source: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            success: true,
            source: source.into(),
            items,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            source: source.into(),
            items: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The catalog command implementation.
pub struct CatalogCommand {
    path: Option<std::path::PathBuf>,
}

impl CatalogCommand {
    /// Create a new catalog command. `None` lists the built-in alphabet.
    pub fn new(path: Option<impl AsRef<Path>>) -> Self {
        Self {
            path: path.map(|p| p.as_ref().to_path_buf()),
        }
    }

    /// Run the catalog command.
    pub fn run(&self, _options: &CatalogOptions) -> CatalogOutput {
        let source = match &self.path {
            Some(path) => path.display().to_string(),
            None => "built-in alphabet".to_string(),
        };

        match load_catalog(self.path.as_deref()) {
            Ok(catalog) => CatalogOutput::success(source, catalog.items().to_vec()),
            Err(e) => CatalogOutput::failure(source, e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CatalogOutput, options: &CatalogOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &CatalogOutput) -> String {
        if !output.success {
            return format!(
                "Failed to load catalog from {}: {}\n",
                output.source,
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = vec![format!(
            "{} items ({})",
            output.items.len(),
            output.source
        )];
        for item in &output.items {
            match &item.presentation {
                Some(presentation) => lines.push(format!(
                    "  {:<12} {:<12} {}",
                    item.id, item.display, presentation
                )),
                None => lines.push(format!("  {:<12} {}", item.id, item.display)),
            }
        }

        lines.join("\n") + "\n"
    }
}
