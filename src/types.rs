use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single catalogued document. Built once by the scanner and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Path relative to the document root, `/`-separated. Unique within an index.
    pub id: String,
    pub absolute_path: PathBuf,
    pub relative_path: String,
    pub filename: String,
    /// First path segment under the root, empty for files sitting at the root.
    pub category: String,
    pub category_label: String,
    pub year: Option<String>,
}

/// A distinct category as reported by the metadata summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub key: String,
    pub label: String,
}

/// Distinct categories (first-seen order) and years (newest first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsMeta {
    pub categories: Vec<CategoryEntry>,
    pub years: Vec<String>,
}

/// Exact-match filter for listing. `None` and `Some("")` impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

impl DocsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// Returns true when every specified field equals the record's field.
    pub fn matches(&self, doc: &DocumentRecord) -> bool {
        if let Some(category) = active(&self.category) {
            if doc.category != category {
                return false;
            }
        }

        if let Some(year) = active(&self.year) {
            if doc.year.as_deref() != Some(year) {
                return false;
            }
        }

        true
    }
}

/// Parameters for a two-phase search. `q` follows the wire name used by UI callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn filter(&self) -> DocsFilter {
        DocsFilter {
            category: self.category.clone(),
            year: self.year.clone(),
        }
    }

    /// The trimmed query, or `None` when the search is a plain browse.
    pub fn trimmed_query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Summary of the currently cached index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    pub categories: usize,
    pub years: usize,
    pub built_at: DateTime<Utc>,
    pub build_duration_ms: u64,
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
