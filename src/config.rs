//! Layered configuration: built-in defaults, then a TOML file, then
//! `DOCSHELF__SECTION__KEY` environment variables.

use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DocShelfError, Result};

pub const CONFIG_FILE_NAME: &str = "docshelf.toml";
pub const ENV_PREFIX: &str = "DOCSHELF";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocShelfConfig {
    #[serde(default)]
    pub documents: DocumentsConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where documents live and which files count as documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    #[serde(default = "default_follow_symlinks")]
    pub follow_symlinks: bool,

    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default)]
    pub include_hidden: bool,
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("documents")
}

fn default_include_patterns() -> Vec<String> {
    vec!["**/*.pdf".to_string()]
}

fn default_follow_symlinks() -> bool {
    true
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            include_patterns: default_include_patterns(),
            exclude_patterns: Vec::new(),
            follow_symlinks: default_follow_symlinks(),
            max_depth: None,
            include_hidden: false,
        }
    }
}

/// How the content phase of a search is scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentScanMode {
    /// Fan out extractions; content matches are appended in completion order.
    #[default]
    Concurrent,
    /// Extract one candidate at a time; content matches keep index order.
    Sequential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub content_scan: ContentScanMode,

    #[serde(default = "default_max_concurrent_extractions")]
    pub max_concurrent_extractions: usize,
}

/// Extraction is mostly file I/O and blocking-pool work, so small hosts still fan out.
pub const MIN_CONCURRENT_EXTRACTIONS: usize = 8;

fn default_max_concurrent_extractions() -> usize {
    num_cpus::get().max(MIN_CONCURRENT_EXTRACTIONS)
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            content_scan: ContentScanMode::default(),
            max_concurrent_extractions: default_max_concurrent_extractions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl DocShelfConfig {
    /// Load from the default config location (if it exists) and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path().as_deref())
    }

    /// Load from an explicit file. A missing file falls back to defaults.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let defaults = toml::to_string(&DocShelfConfig::default())?;
        let mut builder = Config::builder().add_source(File::from_str(&defaults, FileFormat::Toml));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let loaded: DocShelfConfig = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "docshelf").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.documents.include_patterns.is_empty() {
            return Err(DocShelfError::Config(
                "documents.include_patterns must not be empty".to_string(),
            ));
        }
        if self.search.max_concurrent_extractions == 0 {
            return Err(DocShelfError::Config(
                "search.max_concurrent_extractions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
