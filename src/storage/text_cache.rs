use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// One cache entry per absolute path. The cell is filled exactly once, by
/// whichever caller gets to extract first; everyone else waits on it.
pub type TextSlot = Arc<OnceCell<Arc<str>>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Extractions that failed and were cached as empty text.
    pub failures: u64,
    pub entries: usize,
}

/// Extracted text keyed by absolute path. Entries are never evicted; a failed
/// extraction is stored as `""`.
#[derive(Debug, Default)]
pub struct TextCache {
    entries: DashMap<PathBuf, TextSlot>,
    stats: Mutex<TextCacheStats>,
}

impl TextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `path`, created empty on first request.
    ///
    /// If the caller filling a slot is dropped mid-extraction the slot stays in the
    /// map unfilled. The next caller fills it; `len` and `get` ignore it meanwhile,
    /// and `clear` drops it along with everything else.
    pub fn slot(&self, path: &Path) -> TextSlot {
        if let Some(slot) = self.entries.get(path) {
            return slot.clone();
        }
        self.entries
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Cached text for `path`, if an extraction has completed.
    pub fn get(&self, path: &Path) -> Option<Arc<str>> {
        self.entries
            .get(path)
            .and_then(|slot| slot.get().cloned())
    }

    /// Store `text` unless the path already has a value. Returns whether it was stored.
    pub fn insert(&self, path: &Path, text: impl Into<Arc<str>>) -> bool {
        self.slot(path).set(text.into()).is_ok()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    /// Number of populated entries. Walks the map to skip pending slots.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.clear();
        let mut stats = self.stats.lock();
        *stats = TextCacheStats::default();
    }

    pub fn stats(&self) -> TextCacheStats {
        let mut stats = self.stats.lock().clone();
        stats.entries = self.len();
        stats
    }

    pub(crate) fn record_hit(&self) {
        self.stats.lock().hits += 1;
    }

    pub(crate) fn record_miss(&self) {
        self.stats.lock().misses += 1;
    }

    pub(crate) fn record_failure(&self) {
        self.stats.lock().failures += 1;
    }
}
