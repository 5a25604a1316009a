use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::scanner::DocumentScanner;
use crate::types::{DocumentRecord, IndexStats};

/// Immutable snapshot of every document found by one scan.
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    documents: Vec<DocumentRecord>,
    id_index: HashMap<String, usize>, // id -> position
    built_at: DateTime<Utc>,
    build_duration_ms: u64,
}

impl DocumentIndex {
    pub fn new(documents: Vec<DocumentRecord>) -> Self {
        Self::with_build_info(documents, Utc::now(), 0)
    }

    fn with_build_info(
        documents: Vec<DocumentRecord>,
        built_at: DateTime<Utc>,
        build_duration_ms: u64,
    ) -> Self {
        let id_index = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (doc.id.clone(), i))
            .collect();

        Self {
            documents,
            id_index,
            built_at,
            build_duration_ms,
        }
    }

    /// All records in scan order.
    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&DocumentRecord> {
        self.id_index.get(id).and_then(|&i| self.documents.get(i))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.documents.iter()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn stats(&self) -> IndexStats {
        let categories: HashSet<&str> = self
            .documents
            .iter()
            .map(|d| d.category.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        let years: HashSet<&str> = self
            .documents
            .iter()
            .filter_map(|d| d.year.as_deref())
            .collect();

        IndexStats {
            documents: self.documents.len(),
            categories: categories.len(),
            years: years.len(),
            built_at: self.built_at,
            build_duration_ms: self.build_duration_ms,
        }
    }
}

/// Lazily built, memoized [`DocumentIndex`] for one document root.
///
/// The first [`get_index`](Self::get_index) scans the root; later calls reuse the
/// snapshot until [`invalidate`](Self::invalidate) or [`rebuild`](Self::rebuild).
/// Concurrent first callers wait for a single scan.
#[derive(Debug)]
pub struct IndexCache {
    root: PathBuf,
    scanner: DocumentScanner,
    snapshot: Mutex<Option<Arc<DocumentIndex>>>,
    builds: AtomicUsize,
}

impl IndexCache {
    pub fn new(root: impl Into<PathBuf>, scanner: DocumentScanner) -> Self {
        Self {
            root: root.into(),
            scanner,
            snapshot: Mutex::new(None),
            builds: AtomicUsize::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn get_index(&self) -> Arc<DocumentIndex> {
        let mut snapshot = self.snapshot.lock().await;
        if let Some(index) = snapshot.as_ref() {
            return index.clone();
        }

        let index = Arc::new(self.build().await);
        *snapshot = Some(index.clone());
        index
    }

    /// Drop the snapshot; the next access rescans.
    pub async fn invalidate(&self) {
        let mut snapshot = self.snapshot.lock().await;
        if snapshot.take().is_some() {
            info!("Document index for {} invalidated", self.root.display());
        }
    }

    /// Rescan now and replace the snapshot.
    pub async fn rebuild(&self) -> Arc<DocumentIndex> {
        let mut snapshot = self.snapshot.lock().await;
        let index = Arc::new(self.build().await);
        *snapshot = Some(index.clone());
        index
    }

    pub async fn is_built(&self) -> bool {
        self.snapshot.lock().await.is_some()
    }

    /// How many scans this cache has performed.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    async fn build(&self) -> DocumentIndex {
        let start = Instant::now();
        self.builds.fetch_add(1, Ordering::SeqCst);

        let scanner = self.scanner.clone();
        let root = self.root.clone();
        let documents = match tokio::task::spawn_blocking(move || scanner.build(&root)).await {
            Ok(documents) => documents,
            Err(e) => {
                error!("Document index build task failed: {}", e);
                Vec::new()
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Indexed {} documents under {} in {}ms",
            documents.len(),
            self.root.display(),
            duration_ms
        );

        DocumentIndex::with_build_info(documents, Utc::now(), duration_ms)
    }
}
