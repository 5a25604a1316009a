use globset::{Glob, GlobSet, GlobSetBuilder};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::DocumentsConfig;
use crate::error::{DocShelfError, Result};
use crate::metadata::{derive_category, derive_category_label, derive_filename, derive_year};
use crate::types::DocumentRecord;

/// A matching file: its `/`-separated path relative to the root and its real location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// Files discovered under a root, before metadata derivation.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub root: PathBuf,
    /// In walk order.
    pub files: Vec<ScannedFile>,
    pub skipped_entries: usize,
    /// Files kept under a lossily decoded relative path because their name is not UTF-8.
    pub lossy_names: usize,
    pub duration_ms: u64,
}

impl ScanResult {
    pub fn relative_paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.relative_path.as_str()).collect()
    }
}

/// Walks a document root and turns every matching file into a [`DocumentRecord`].
#[derive(Debug, Clone)]
pub struct DocumentScanner {
    include: GlobSet,
    exclude: GlobSet,
    follow_symlinks: bool,
    max_depth: Option<usize>,
    include_hidden: bool,
}

impl DocumentScanner {
    pub fn new(config: &DocumentsConfig) -> Result<Self> {
        Ok(Self {
            include: build_globset(&config.include_patterns)?,
            exclude: build_globset(&config.exclude_patterns)?,
            follow_symlinks: config.follow_symlinks,
            max_depth: config.max_depth,
            include_hidden: config.include_hidden,
        })
    }

    /// Enumerate matching files. Fails only when the root itself cannot be walked.
    pub fn scan(&self, root: &Path) -> Result<ScanResult> {
        let start = Instant::now();

        if !root.is_dir() {
            return Err(DocShelfError::Scan {
                root: root.to_path_buf(),
                message: "not a readable directory".to_string(),
            });
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.include_hidden;
        let mut files = Vec::new();
        let mut skipped_entries = 0;
        let mut lossy_names = 0;

        for entry in walker
            .into_iter()
            .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(DocShelfError::Scan {
                        root: root.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    skipped_entries += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some((relative, lossy)) = relative_slash_path(root, entry.path()) else {
                continue;
            };

            if self.include.is_match(&relative) && !self.exclude.is_match(&relative) {
                if lossy {
                    warn!(
                        "File name is not valid UTF-8, indexing as {:?}: {}",
                        relative,
                        entry.path().display()
                    );
                    lossy_names += 1;
                }
                files.push(ScannedFile {
                    relative_path: relative,
                    absolute_path: entry.path().to_path_buf(),
                });
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Scanned {} in {}ms: {} matching files, {} skipped entries, {} lossy names",
            root.display(),
            duration_ms,
            files.len(),
            skipped_entries,
            lossy_names
        );

        Ok(ScanResult {
            root: root.to_path_buf(),
            files,
            skipped_entries,
            lossy_names,
            duration_ms,
        })
    }

    /// Scan `root` and derive a record per file. Scan failures are logged and
    /// produce an empty catalog.
    pub fn build(&self, root: &Path) -> Vec<DocumentRecord> {
        match self.scan(root) {
            Ok(result) => result
                .files
                .into_iter()
                .map(|file| make_record(file.absolute_path, &file.relative_path))
                .collect(),
            Err(e) => {
                error!("Error building document index: {}", e);
                Vec::new()
            }
        }
    }
}

/// Derive a record for the file at `absolute_path`, known by its `/`-separated
/// `relative_path`.
pub fn make_record(absolute_path: PathBuf, relative_path: &str) -> DocumentRecord {
    let filename = derive_filename(relative_path).to_string();
    let category = derive_category(relative_path).to_string();
    let category_label = derive_category_label(&category);
    let year = derive_year(relative_path, &filename);

    DocumentRecord {
        id: relative_path.to_string(),
        absolute_path,
        relative_path: relative_path.to_string(),
        filename,
        category,
        category_label,
        year,
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// `/`-joined path of `path` below `root`, and whether any segment had to be decoded lossily.
fn relative_slash_path(root: &Path, path: &Path) -> Option<(String, bool)> {
    let relative = path.strip_prefix(root).ok()?;
    let mut lossy = false;
    let segments: Vec<Cow<'_, str>> = relative
        .components()
        .map(|c| {
            let segment = c.as_os_str().to_string_lossy();
            lossy |= matches!(segment, Cow::Owned(_));
            segment
        })
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some((segments.join("/"), lossy))
}
