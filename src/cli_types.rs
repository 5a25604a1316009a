use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "docshelf", version, about = "Browse and search a local PDF document tree")]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = "DOCSHELF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Document root, overriding the configured one
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show categories and years present in the catalog
    Meta,
    /// List documents
    List(ListArgs),
    /// Search filenames, then document text
    Search(SearchArgs),
    /// Show the effective configuration
    Config,
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[arg(short, long)]
    pub category: Option<String>,

    #[arg(short, long)]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Text to look for; omit to browse
    pub query: Option<String>,

    #[arg(short, long)]
    pub category: Option<String>,

    #[arg(short, long)]
    pub year: Option<String>,

    /// Extract candidates one at a time, keeping index order
    #[arg(long)]
    pub sequential: bool,
}
