use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::config::{ContentScanMode, SearchConfig};
use crate::extract::ExtractionService;
use crate::storage::{DocumentIndex, IndexCache};
use crate::types::{CategoryEntry, DocsFilter, DocsMeta, DocumentRecord, SearchParams};

/// Metadata aggregation, filtering and two-phase search over the cached index.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    index: Arc<IndexCache>,
    extraction: Arc<ExtractionService>,
    content_scan: ContentScanMode,
    max_concurrent_extractions: usize,
}

impl QueryEngine {
    pub fn new(index: Arc<IndexCache>, extraction: Arc<ExtractionService>) -> Self {
        Self::with_config(index, extraction, &SearchConfig::default())
    }

    pub fn with_config(
        index: Arc<IndexCache>,
        extraction: Arc<ExtractionService>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            index,
            extraction,
            content_scan: config.content_scan,
            max_concurrent_extractions: config.max_concurrent_extractions.max(1),
        }
    }

    pub fn content_scan_mode(&self) -> ContentScanMode {
        self.content_scan
    }

    /// Distinct categories in first-seen order and distinct years, newest first.
    pub async fn get_meta(&self) -> DocsMeta {
        let index = self.index.get_index().await;
        summarize(&index)
    }

    pub async fn list_docs(&self, filter: &DocsFilter) -> Vec<DocumentRecord> {
        let index = self.index.get_index().await;
        filter_docs(&index, filter)
    }

    pub async fn get_doc(&self, id: &str) -> Option<DocumentRecord> {
        self.index.get_index().await.get(id).cloned()
    }

    /// Filename matches (index order) followed by content matches.
    ///
    /// A blank query is a plain browse and returns the filtered list unchanged.
    pub async fn search_docs(&self, params: &SearchParams) -> Vec<DocumentRecord> {
        let candidates = self.list_docs(&params.filter()).await;

        let Some(query) = params.trimmed_query() else {
            return candidates;
        };

        let start = Instant::now();
        let needle = query.to_lowercase();

        let (filename_matches, remaining): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|doc| doc.filename.to_lowercase().contains(&needle));

        let remaining_count = remaining.len();
        let content_matches = match self.content_scan {
            ContentScanMode::Concurrent => self.scan_content_concurrent(remaining, &needle).await,
            ContentScanMode::Sequential => self.scan_content_sequential(remaining, &needle).await,
        };

        debug!(
            "Search {:?}: {} filename matches, {} of {} content matches in {}ms",
            query,
            filename_matches.len(),
            content_matches.len(),
            remaining_count,
            start.elapsed().as_millis()
        );

        let mut results = filename_matches;
        results.extend(content_matches);
        results
    }

    async fn scan_content_concurrent(
        &self,
        candidates: Vec<DocumentRecord>,
        needle: &str,
    ) -> Vec<DocumentRecord> {
        stream::iter(candidates)
            .map(|doc| async move {
                let text = self.extraction.extract_text(&doc.absolute_path).await;
                text.to_lowercase().contains(needle).then_some(doc)
            })
            .buffer_unordered(self.max_concurrent_extractions)
            .filter_map(|found| async move { found })
            .collect()
            .await
    }

    async fn scan_content_sequential(
        &self,
        candidates: Vec<DocumentRecord>,
        needle: &str,
    ) -> Vec<DocumentRecord> {
        let mut matches = Vec::new();
        for doc in candidates {
            let text = self.extraction.extract_text(&doc.absolute_path).await;
            if text.to_lowercase().contains(needle) {
                matches.push(doc);
            }
        }
        matches
    }
}

fn summarize(index: &DocumentIndex) -> DocsMeta {
    let mut seen_categories = HashSet::new();
    let mut categories = Vec::new();
    let mut years = Vec::new();
    let mut seen_years = HashSet::new();

    for doc in index.iter() {
        if !doc.category.is_empty() && seen_categories.insert(doc.category.as_str()) {
            categories.push(CategoryEntry {
                key: doc.category.clone(),
                label: doc.category_label.clone(),
            });
        }
        if let Some(year) = doc.year.as_deref() {
            if seen_years.insert(year) {
                years.push(year.to_string());
            }
        }
    }

    years.sort_by_key(|year| std::cmp::Reverse(year.parse::<u32>().unwrap_or(0)));

    DocsMeta { categories, years }
}

fn filter_docs(index: &DocumentIndex, filter: &DocsFilter) -> Vec<DocumentRecord> {
    index
        .iter()
        .filter(|doc| filter.matches(doc))
        .cloned()
        .collect()
}
