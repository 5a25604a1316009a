pub mod types;
pub mod error;
pub mod metadata;
pub mod scanner;
pub mod storage;
pub mod extract;
pub mod query;
pub mod config;
pub mod docshelf;
pub mod tools;
pub mod cli;
pub mod cli_types;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used types
pub use types::*;
pub use error::{DocShelfError, ExtractionError, Result};
pub use metadata::{derive_category_label, derive_year};
pub use scanner::{DocumentScanner, ScanResult, ScannedFile};
pub use storage::{DocumentIndex, IndexCache, TextCache, TextCacheStats};
pub use extract::{ExtractionService, PdfTextExtractor, TextExtractor};
pub use query::QueryEngine;
pub use crate::config::{ContentScanMode, DocShelfConfig};
pub use docshelf::{DocShelf, DocShelfBuilder};
pub use tools::{DocumentTools, ToolResult, ToolSchema};
pub use cli::CliApp;
