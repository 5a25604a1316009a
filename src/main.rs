use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docshelf::{
    cli::CliApp,
    cli_types::{Cli, Commands},
    config::{ContentScanMode, DocShelfConfig, LoggingConfig},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DocShelfConfig::load_from(Some(path.as_path())),
        None => DocShelfConfig::load(),
    }
    .context("Failed to load configuration")?;

    init_logging(&config.logging, cli.verbose);

    if let Some(root) = &cli.root {
        config.documents.root_dir = root.clone();
    }
    if let Commands::Search(args) = &cli.command {
        if args.sequential {
            config.search.content_scan = ContentScanMode::Sequential;
        }
    }

    let app = CliApp::new(config, cli.verbose, cli.json, !cli.no_color)?;
    app.run(cli.command).await
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docshelf={}", default_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
