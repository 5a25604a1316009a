//! Document-to-text extraction with a per-path cache.
//!
//! The actual parsing is a pluggable [`TextExtractor`]; the service in front of it
//! reads files, runs the extractor off the async workers, and memoizes the result.
//! Failures are logged and degrade to empty text.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::storage::TextCache;

/// Turns raw document bytes into plain text.
#[cfg_attr(test, mockall::automock)]
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// PDF backend built on `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Parse(e.to_string()))
    }
}

pub struct ExtractionService {
    extractor: Arc<dyn TextExtractor>,
    cache: Arc<TextCache>,
}

impl ExtractionService {
    pub fn new(extractor: Arc<dyn TextExtractor>, cache: Arc<TextCache>) -> Self {
        Self { extractor, cache }
    }

    pub fn with_pdf_extractor(cache: Arc<TextCache>) -> Self {
        Self::new(Arc::new(PdfTextExtractor::new()), cache)
    }

    pub fn cache(&self) -> &Arc<TextCache> {
        &self.cache
    }

    /// Text of the document at `path`. The first call per path reads and parses the
    /// file; every later call (including ones racing the first) gets the cached value.
    pub async fn extract_text(&self, path: &Path) -> Arc<str> {
        let slot = self.cache.slot(path);
        if let Some(text) = slot.get() {
            debug!("Text cache hit for {}", path.display());
            self.cache.record_hit();
            return text.clone();
        }

        slot.get_or_init(|| async {
            self.cache.record_miss();
            match self.extract_uncached(path).await {
                Ok(text) => Arc::from(text),
                Err(e) => {
                    warn!("Error extracting text from {}: {}", path.display(), e);
                    self.cache.record_failure();
                    Arc::from("")
                }
            }
        })
        .await
        .clone()
    }

    async fn extract_uncached(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ExtractionError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let extractor = self.extractor.clone();
        let text = tokio::task::spawn_blocking(move || extractor.extract_text(&bytes))
            .await
            .map_err(|e| ExtractionError::Join(e.to_string()))??;

        debug!("Extracted {} chars from {}", text.len(), path.display());
        Ok(text)
    }
}

impl std::fmt::Debug for ExtractionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn service_with(mock: MockTextExtractor) -> ExtractionService {
        ExtractionService::new(Arc::new(mock), Arc::new(TextCache::new()))
    }

    #[tokio::test]
    async fn test_second_call_hits_cache() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(&dir, "a.pdf", "fracture detected");

        let mut mock = MockTextExtractor::new();
        mock.expect_extract_text()
            .times(1)
            .returning(|bytes| Ok(String::from_utf8_lossy(bytes).into_owned()));

        let service = service_with(mock);
        assert_eq!(&*service.extract_text(&path).await, "fracture detected");
        assert_eq!(&*service.extract_text(&path).await, "fracture detected");

        let stats = service.cache().stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_cached_value_survives_file_changes() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(&dir, "a.pdf", "original");

        let mut mock = MockTextExtractor::new();
        mock.expect_extract_text()
            .times(1)
            .returning(|bytes| Ok(String::from_utf8_lossy(bytes).into_owned()));

        let service = service_with(mock);
        service.extract_text(&path).await;
        fs::write(&path, "rewritten").unwrap();
        assert_eq!(&*service.extract_text(&path).await, "original");
    }

    #[tokio::test]
    async fn test_parse_failure_cached_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(&dir, "broken.pdf", "garbage");

        let mut mock = MockTextExtractor::new();
        mock.expect_extract_text()
            .times(1)
            .returning(|_| Err(ExtractionError::Parse("bad xref".to_string())));

        let service = service_with(mock);
        assert_eq!(&*service.extract_text(&path).await, "");
        assert_eq!(&*service.extract_text(&path).await, "");
        assert_eq!(service.cache().get(&path).as_deref(), Some(""));
        assert_eq!(service.cache().stats().failures, 1);
    }

    #[tokio::test]
    async fn test_unreadable_file_cached_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.pdf");

        let mut mock = MockTextExtractor::new();
        mock.expect_extract_text().never();

        let service = service_with(mock);
        assert_eq!(&*service.extract_text(&path).await, "");
        assert!(service.cache().contains(&path));
        assert_eq!(service.cache().stats().failures, 1);
    }

    #[tokio::test]
    async fn test_prepopulated_cache_skips_io() {
        let cache = Arc::new(TextCache::new());
        let path = Path::new("/nowhere/at/all.pdf");
        cache.insert(path, "warm");

        let mut mock = MockTextExtractor::new();
        mock.expect_extract_text().never();

        let service = ExtractionService::new(Arc::new(mock), cache);
        assert_eq!(&*service.extract_text(path).await, "warm");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_extraction() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(&dir, "a.pdf", "shared text");

        let mut mock = MockTextExtractor::new();
        mock.expect_extract_text().times(1).returning(|bytes| {
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(String::from_utf8_lossy(bytes).into_owned())
        });

        let service = Arc::new(service_with(mock));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                let path = path.clone();
                tokio::spawn(async move { service.extract_text(&path).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(&*handle.await.unwrap(), "shared text");
        }
        assert_eq!(service.cache().len(), 1);
    }

    #[test]
    fn test_pdf_extractor_rejects_garbage() {
        let extractor = PdfTextExtractor::new();
        let result = extractor.extract_text(b"definitely not a pdf");
        assert!(matches!(result, Err(ExtractionError::Parse(_))));
    }
}
