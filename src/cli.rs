use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::info;

use crate::{
    cli_types::{Commands, ListArgs, SearchArgs},
    config::DocShelfConfig,
    docshelf::DocShelf,
    tools::{DocumentTools, TOOL_LIST, TOOL_META, TOOL_SEARCH},
    types::{DocsFilter, DocsMeta, DocumentRecord, SearchParams},
};

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "File")]
    filename: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&DocumentRecord> for DocumentRow {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            category: doc.category_label.clone(),
            year: doc.year.clone().unwrap_or_else(|| "-".to_string()),
            filename: doc.filename.clone(),
            path: doc.relative_path.clone(),
        }
    }
}

pub struct CliApp {
    shelf: Arc<DocShelf>,
    tools: DocumentTools,
    verbose: bool,
    json: bool,
}

impl CliApp {
    pub fn new(config: DocShelfConfig, verbose: bool, json: bool, colors_enabled: bool) -> Result<Self> {
        info!("Initializing docshelf CLI");
        colored::control::set_override(colors_enabled);

        let shelf = Arc::new(DocShelf::new(config).context("Failed to create document catalog")?);
        let tools = DocumentTools::new(shelf.clone());

        Ok(Self {
            shelf,
            tools,
            verbose,
            json,
        })
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Meta => self.meta().await,
            Commands::List(args) => self.list(args).await,
            Commands::Search(args) => self.search(args).await,
            Commands::Config => self.show_config(),
        }
    }

    pub async fn meta(&self) -> Result<()> {
        if self.json {
            return self.print_tool_output(TOOL_META, Value::Null).await;
        }

        self.print_header("Catalog");
        let meta = self.shelf.get_meta().await;
        println!("{}", self.format_meta(&meta));

        if self.verbose {
            let stats = self.shelf.index_stats().await;
            self.print_info(&format!(
                "{} documents indexed from {} in {}ms",
                stats.documents,
                self.shelf.root().display(),
                stats.build_duration_ms
            ));
        }
        Ok(())
    }

    pub async fn list(&self, args: ListArgs) -> Result<()> {
        let filter = DocsFilter {
            category: args.category,
            year: args.year,
        };

        if self.json {
            let input = serde_json::to_value(&filter).context("Failed to encode filter")?;
            return self.print_tool_output(TOOL_LIST, input).await;
        }

        self.print_header("Documents");
        let docs = self.shelf.list_docs(&filter).await;
        self.print_documents(&docs);
        Ok(())
    }

    pub async fn search(&self, args: SearchArgs) -> Result<()> {
        let params = SearchParams {
            q: args.query,
            category: args.category,
            year: args.year,
        };

        if self.json {
            let input = serde_json::to_value(&params).context("Failed to encode search")?;
            return self.print_tool_output(TOOL_SEARCH, input).await;
        }

        self.print_header("Search");
        if self.verbose {
            if let Some(q) = params.trimmed_query() {
                self.print_info(&format!("Query: {}", q));
            }
            self.print_info(&format!(
                "Content scan: {:?}",
                self.shelf.config().search.content_scan
            ));
        }

        let start = Instant::now();
        let docs = self.shelf.search_docs(&params).await;
        self.print_documents(&docs);

        if self.verbose {
            let stats = self.shelf.text_cache_stats();
            self.print_info(&format!(
                "Search completed in {:?} ({} extracted, {} unreadable)",
                start.elapsed(),
                stats.misses,
                stats.failures
            ));
        }
        Ok(())
    }

    pub fn show_config(&self) -> Result<()> {
        if self.json {
            let rendered = serde_json::to_string_pretty(self.shelf.config())
                .context("Failed to serialize configuration")?;
            println!("{}", rendered);
            return Ok(());
        }

        let rendered = toml::to_string_pretty(self.shelf.config())
            .context("Failed to serialize configuration")?;
        self.print_header("Configuration");
        if let Some(path) = DocShelfConfig::default_path() {
            self.print_info(&format!("Default config file: {}", path.display()));
        }
        println!("{}", rendered);
        Ok(())
    }

    async fn print_tool_output(&self, tool: &str, input: Value) -> Result<()> {
        let result = self
            .tools
            .execute_tool(tool, input)
            .await
            .with_context(|| format!("Failed to run {}", tool))?;
        let json = serde_json::to_string_pretty(&result.data).context("Failed to serialize result")?;
        println!("{}", json);
        Ok(())
    }

    fn format_meta(&self, meta: &DocsMeta) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", "Categories:".bold()));
        if meta.categories.is_empty() {
            out.push_str("  (none)\n");
        }
        for category in &meta.categories {
            out.push_str(&format!("  {} {}\n", category.label.green(), format!("({})", category.key).dimmed()));
        }

        out.push_str(&format!("{}\n", "Years:".bold()));
        if meta.years.is_empty() {
            out.push_str("  (none)");
        } else {
            out.push_str(&format!("  {}", meta.years.join(", ")));
        }
        out
    }

    fn print_documents(&self, docs: &[DocumentRecord]) {
        if docs.is_empty() {
            self.print_warning("No documents found");
            return;
        }

        println!("{}", format_documents(docs));
        self.print_success(&format!("{} document(s)", docs.len()));
    }

    fn print_header(&self, title: &str) {
        println!("{}", title.bold().underline());
    }

    fn print_success(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    fn print_info(&self, message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    fn print_warning(&self, message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }
}

fn format_documents(docs: &[DocumentRecord]) -> String {
    let rows: Vec<DocumentRow> = docs.iter().map(DocumentRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategoryEntry;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_app(dir: &TempDir, json: bool) -> CliApp {
        let mut config = DocShelfConfig::default();
        config.documents.root_dir = dir.path().to_path_buf();
        CliApp::new(config, false, json, false).unwrap()
    }

    fn create_test_file(dir: &TempDir, relative: &str) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"not really a pdf").unwrap();
    }

    #[test]
    fn test_format_documents_table() {
        let docs = vec![DocumentRecord {
            id: "02_Imaging/report.pdf".to_string(),
            absolute_path: "/docs/02_Imaging/report.pdf".into(),
            relative_path: "02_Imaging/report.pdf".to_string(),
            filename: "report.pdf".to_string(),
            category: "02_Imaging".to_string(),
            category_label: "Imaging".to_string(),
            year: None,
        }];

        let table = format_documents(&docs);
        assert!(table.contains("Category"));
        assert!(table.contains("Imaging"));
        assert!(table.contains("report.pdf"));
        assert!(table.contains('-'));
    }

    #[test]
    fn test_format_meta() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir, false);
        let meta = DocsMeta {
            categories: vec![CategoryEntry {
                key: "01_Bloodwork".to_string(),
                label: "Bloodwork".to_string(),
            }],
            years: vec!["2021".to_string(), "2020".to_string()],
        };

        let text = app.format_meta(&meta);
        assert!(text.contains("Bloodwork"));
        assert!(text.contains("(01_Bloodwork)"));
        assert!(text.contains("2021, 2020"));

        let empty = app.format_meta(&DocsMeta::default());
        assert!(empty.contains("(none)"));
    }

    #[tokio::test]
    async fn test_commands_run_on_real_tree() {
        let dir = TempDir::new().unwrap();
        create_test_file(&dir, "01_Bloodwork/2020-01-01-cbc.pdf");
        create_test_file(&dir, "02_Imaging/report.pdf");

        for json in [false, true] {
            let app = create_test_app(&dir, json);
            assert!(app.run(Commands::Meta).await.is_ok());
            assert!(app
                .run(Commands::List(ListArgs { category: None, year: Some("2020".to_string()) }))
                .await
                .is_ok());
            assert!(app
                .run(Commands::Search(SearchArgs {
                    query: Some("cbc".to_string()),
                    category: None,
                    year: None,
                    sequential: false,
                }))
                .await
                .is_ok());
            assert!(app.run(Commands::Config).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_search_survives_unparseable_pdfs() {
        let dir = TempDir::new().unwrap();
        create_test_file(&dir, "02_Imaging/report.pdf");

        let app = create_test_app(&dir, false);
        let result = app
            .search(SearchArgs {
                query: Some("fracture".to_string()),
                category: None,
                year: None,
                sequential: false,
            })
            .await;
        assert!(result.is_ok());
        assert_eq!(app.shelf.text_cache_stats().failures, 1);
    }
}
