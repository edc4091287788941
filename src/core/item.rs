//! Drillable items and the catalog they come from.
//!
//! The catalog is supplied whole by the shell and never mutated by the
//! engine. Items are compared for correctness by their answer token, not by
//! their display form.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DrillError, Result};

/// A single drillable unit (a letter or a word).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Item {
    /// Stable identity (e.g. `"a"` or `"cat"`).
    pub id: String,
    /// What the shell shows on the choice button.
    pub display: String,
    /// Canonical token used for correctness comparison.
    pub answer: String,
    /// Presentation key for the shell (audio file, glyph hint). Not
    /// interpreted by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<String>,
}

impl Item {
    /// Create an item whose display form is its id.
    pub fn new(id: impl Into<String>, answer: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display: id.clone(),
            id,
            answer: answer.into(),
            presentation: None,
        }
    }

    /// Set the display form.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    /// Set the presentation key.
    pub fn with_presentation(mut self, presentation: impl Into<String>) -> Self {
        self.presentation = Some(presentation.into());
        self
    }

    /// Whether choosing `self` answers a prompt for `target`.
    pub fn answers(&self, target: &Item) -> bool {
        self.answer == target.answer
    }
}

/// An ordered, non-empty collection of items with unique ids.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Catalog {
    items: Vec<Item>,
}

/// On-disk catalog layout: either `{"items": [...]}` or a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped { items: Vec<Item> },
    Bare(Vec<Item>),
}

impl CatalogFile {
    fn into_items(self) -> Vec<Item> {
        match self {
            CatalogFile::Wrapped { items } | CatalogFile::Bare(items) => items,
        }
    }
}

impl Catalog {
    /// Build a catalog, rejecting empty input and duplicate ids.
    pub fn new(items: Vec<Item>) -> Result<Self> {
        if items.is_empty() {
            return Err(DrillError::catalog("catalog is empty"));
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(DrillError::catalog(format!(
                    "duplicate item id '{}'",
                    item.id
                )));
            }
        }

        Ok(Self { items })
    }

    /// The built-in catalog: the Latin alphabet, upper-case glyphs, with a
    /// slow-pronunciation audio key as both answer and presentation.
    pub fn alphabet() -> Self {
        let items = ('a'..='z')
            .map(|c| {
                let audio = format!("letters/{c}-slow.mp3");
                Item::new(c.to_string(), audio.clone())
                    .with_display(c.to_ascii_uppercase().to_string())
                    .with_presentation(audio)
            })
            .collect();
        Self { items }
    }

    /// Load a catalog from a JSON or TOML file, chosen by extension.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DrillError::storage(path, e))?;

        let file: CatalogFile = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            other => {
                return Err(DrillError::catalog(format!(
                    "unsupported catalog format {:?} (expected .json or .toml)",
                    other.unwrap_or("")
                )))
            }
        };

        let catalog = Self::new(file.into_items())?;
        tracing::debug!(path = %path.display(), items = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    /// All items in catalog order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Look up an item by id.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_item_new_uses_id_as_display() {
        let item = Item::new("a", "a.mp3");
        assert_eq!(item.display, "a");
        assert_eq!(item.answer, "a.mp3");
        assert!(item.presentation.is_none());
    }

    #[test]
    fn test_answers_compares_answer_token() {
        let target = Item::new("c", "k-sound");
        let homophone = Item::new("k", "k-sound");
        let other = Item::new("s", "s-sound");

        assert!(homophone.answers(&target));
        assert!(!other.answers(&target));
    }

    #[test]
    fn test_catalog_rejects_empty() {
        let result = Catalog::new(vec![]);
        assert!(matches!(result, Err(DrillError::Catalog { .. })));
    }

    #[test]
    fn test_catalog_rejects_duplicate_ids() {
        let result = Catalog::new(vec![Item::new("a", "1"), Item::new("a", "2")]);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("duplicate item id 'a'"));
    }

    #[test]
    fn test_alphabet_catalog() {
        let catalog = Catalog::alphabet();
        assert_eq!(catalog.len(), 26);

        let a = catalog.get("a").unwrap();
        assert_eq!(a.display, "A");
        assert_eq!(a.answer, "letters/a-slow.mp3");
        assert_eq!(a.presentation.as_deref(), Some("letters/a-slow.mp3"));
        assert_eq!(catalog.items()[25].id, "z");
    }

    #[test]
    fn test_get_missing_item() {
        assert!(Catalog::alphabet().get("zz").is_none());
    }

    #[test]
    fn test_load_json_wrapped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("words.json");
        fs::write(
            &path,
            r#"{"items": [
                {"id": "cat", "display": "cat", "answer": "words/cat.mp3"},
                {"id": "dog", "display": "dog", "answer": "words/dog.mp3", "presentation": "dog.png"}
            ]}"#,
        )
        .unwrap();

        let catalog = Catalog::load_from_file(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get("dog").unwrap().presentation.as_deref(),
            Some("dog.png")
        );
    }

    #[test]
    fn test_load_json_bare_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("letters.json");
        fs::write(
            &path,
            r#"[{"id": "a", "display": "A", "answer": "a"}]"#,
        )
        .unwrap();

        let catalog = Catalog::load_from_file(&path).unwrap();
        assert_eq!(catalog.items()[0].display, "A");
    }

    #[test]
    fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("letters.toml");
        fs::write(
            &path,
            r#"
[[items]]
id = "b"
display = "B"
answer = "b-slow"

[[items]]
id = "d"
display = "D"
answer = "d-slow"
"#,
        )
        .unwrap();

        let catalog = Catalog::load_from_file(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("d").unwrap().answer, "d-slow");
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("letters.csv");
        fs::write(&path, "a,A,a").unwrap();

        let result = Catalog::load_from_file(&path);
        assert!(matches!(result, Err(DrillError::Catalog { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Catalog::load_from_file(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(DrillError::Storage { .. })));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let result = Catalog::load_from_file(&path);
        assert!(matches!(result, Err(DrillError::Serde { .. })));
    }

    #[test]
    fn test_load_empty_list_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "[]").unwrap();

        let result = Catalog::load_from_file(&path);
        assert!(matches!(result, Err(DrillError::Catalog { .. })));
    }
}
