use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::{ContentScanMode, DocShelfConfig};
use crate::error::Result;
use crate::extract::{ExtractionService, PdfTextExtractor, TextExtractor};
use crate::query::QueryEngine;
use crate::scanner::DocumentScanner;
use crate::storage::{IndexCache, TextCache, TextCacheStats};
use crate::types::{DocsFilter, DocsMeta, DocumentRecord, IndexStats, SearchParams};

/// A document catalog rooted at one directory.
///
/// Owns the index cache, the text cache and the query engine. Hosts construct one
/// per root and share it (it is cheap to wrap in an `Arc`).
#[derive(Debug)]
pub struct DocShelf {
    config: DocShelfConfig,
    index: Arc<IndexCache>,
    text_cache: Arc<TextCache>,
    engine: QueryEngine,
}

impl DocShelf {
    pub fn builder() -> DocShelfBuilder {
        DocShelfBuilder::new()
    }

    pub fn new(config: DocShelfConfig) -> Result<Self> {
        DocShelfBuilder::from_config(config).build()
    }

    pub fn config(&self) -> &DocShelfConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        self.index.root()
    }

    pub async fn get_meta(&self) -> DocsMeta {
        self.engine.get_meta().await
    }

    pub async fn list_docs(&self, filter: &DocsFilter) -> Vec<DocumentRecord> {
        self.engine.list_docs(filter).await
    }

    pub async fn search_docs(&self, params: &SearchParams) -> Vec<DocumentRecord> {
        self.engine.search_docs(params).await
    }

    pub async fn get_doc(&self, id: &str) -> Option<DocumentRecord> {
        self.engine.get_doc(id).await
    }

    pub async fn is_indexed(&self) -> bool {
        self.index.is_built().await
    }

    /// Stats for the current index, building it if needed.
    pub async fn index_stats(&self) -> IndexStats {
        self.index.get_index().await.stats()
    }

    pub fn text_cache_stats(&self) -> TextCacheStats {
        self.text_cache.stats()
    }

    /// Forget the index and all extracted text; the next query rescans.
    pub async fn refresh(&self) {
        self.index.invalidate().await;
        self.text_cache.clear();
        info!("Catalog for {} will be rebuilt on next access", self.root().display());
    }
}

/// Builder for [`DocShelf`]. Starts from defaults; every setter overrides one field.
pub struct DocShelfBuilder {
    config: DocShelfConfig,
    extractor: Option<Arc<dyn TextExtractor>>,
}

impl Default for DocShelfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocShelfBuilder {
    pub fn new() -> Self {
        Self::from_config(DocShelfConfig::default())
    }

    pub fn from_config(config: DocShelfConfig) -> Self {
        Self {
            config,
            extractor: None,
        }
    }

    pub fn root_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.documents.root_dir = root.into();
        self
    }

    pub fn include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.documents.include_patterns = patterns;
        self
    }

    pub fn exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.documents.exclude_patterns = patterns;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.documents.follow_symlinks = follow;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.documents.max_depth = Some(depth);
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.documents.include_hidden = include;
        self
    }

    pub fn content_scan(mut self, mode: ContentScanMode) -> Self {
        self.config.search.content_scan = mode;
        self
    }

    pub fn max_concurrent_extractions(mut self, limit: usize) -> Self {
        self.config.search.max_concurrent_extractions = limit;
        self
    }

    /// Replace the PDF backend, e.g. with a test double.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn build(self) -> Result<DocShelf> {
        self.config.validate()?;

        let scanner = DocumentScanner::new(&self.config.documents)?;
        let index = Arc::new(IndexCache::new(
            self.config.documents.root_dir.clone(),
            scanner,
        ));

        let text_cache = Arc::new(TextCache::new());
        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(PdfTextExtractor::new()));
        let extraction = Arc::new(ExtractionService::new(extractor, text_cache.clone()));

        let engine = QueryEngine::with_config(index.clone(), extraction, &self.config.search);

        Ok(DocShelf {
            config: self.config,
            index,
            text_cache,
            engine,
        })
    }
}
