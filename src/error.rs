use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocShelfError>;

#[derive(Debug, Error)]
pub enum DocShelfError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(#[from] globset::Error),

    #[error("Failed to scan {}: {message}", root.display())]
    Scan { root: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Tool error: {0}")]
    ToolError(String),
}

impl From<config::ConfigError> for DocShelfError {
    fn from(err: config::ConfigError) -> Self {
        DocShelfError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DocShelfError {
    fn from(err: toml::ser::Error) -> Self {
        DocShelfError::Config(err.to_string())
    }
}

/// Failure to turn a document into text. Never escapes the extraction service.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Extraction task failed: {0}")]
    Join(String),
}
