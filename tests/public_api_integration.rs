// Integration test for the public API
use docshelf::{
    derive_category_label, derive_year, ContentScanMode, DocShelf, DocShelfBuilder, DocShelfError,
    DocsFilter, DocsMeta, DocumentRecord, DocumentTools, Result, SearchParams, ToolResult,
    ToolSchema, VERSION,
};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_public_api_exports() {
    let _version: &str = VERSION;

    let builder: DocShelfBuilder = DocShelf::builder();
    let _shelf: Result<DocShelf> = builder.build();

    let _tools: Vec<ToolSchema> = DocumentTools::get_tool_schemas();

    let _error = DocShelfError::ToolError("test".to_string());
}

#[test]
fn test_builder_configuration() {
    let shelf = DocShelf::builder()
        .root_dir("/srv/documents")
        .include_patterns(vec!["**/*.pdf".to_string()])
        .exclude_patterns(vec!["**/archive/**".to_string()])
        .max_depth(4)
        .follow_symlinks(false)
        .include_hidden(false)
        .content_scan(ContentScanMode::Sequential)
        .max_concurrent_extractions(2)
        .build();

    assert!(shelf.is_ok());
    let shelf = shelf.unwrap();
    assert_eq!(shelf.config().documents.max_depth, Some(4));
    assert_eq!(shelf.config().search.max_concurrent_extractions, 2);
}

#[test]
fn test_tool_definitions_structure() {
    let tools = DocumentTools::get_tool_schemas();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert!(names.contains(&"docs:meta"));
    assert!(names.contains(&"docs:list"));
    assert!(names.contains(&"docs:search"));

    for tool in &tools {
        assert!(!tool.description.is_empty());
        assert!(tool.input_schema.is_object());
    }
}

#[tokio::test]
async fn test_missing_root_is_empty_not_error() {
    let shelf = DocShelf::builder()
        .root_dir("/path/that/does/not/exist")
        .build()
        .unwrap();

    assert_eq!(shelf.get_meta().await, DocsMeta::default());
    assert!(shelf.list_docs(&DocsFilter::new()).await.is_empty());
    assert!(shelf
        .search_docs(&SearchParams::new().with_query("anything"))
        .await
        .is_empty());
    assert_eq!(shelf.index_stats().await.documents, 0);
}

#[tokio::test]
async fn test_execute_tool_interface() {
    let shelf = DocShelf::builder()
        .root_dir("/path/that/does/not/exist")
        .build()
        .unwrap();
    let tools = DocumentTools::new(Arc::new(shelf));

    let result = tools.execute_tool("invalid_tool", json!({})).await.unwrap();
    assert!(!result.success);
    assert!(result.error.is_some());

    let result = tools.execute_tool("docs:meta", json!({})).await.unwrap();
    assert!(result.success);
    assert_eq!(result.data, json!({"categories": [], "years": []}));
}

#[test]
fn test_version_constant() {
    assert!(!VERSION.is_empty());
    assert!(VERSION.starts_with("0."));
}

#[test]
fn test_metadata_helpers() {
    assert_eq!(derive_category_label("01_Badania_Krwi"), "Badania Krwi");
    assert_eq!(derive_category_label("Misc"), "Misc");
    assert_eq!(derive_year("2021/scan.pdf", "scan.pdf").as_deref(), Some("2021"));
    assert_eq!(
        derive_year("2019/2022-05-01-report.pdf", "2022-05-01-report.pdf").as_deref(),
        Some("2019")
    );
}

#[test]
fn test_tool_result_creation() {
    let success = ToolResult::success(json!({"test": "value"}));
    assert!(success.success);
    assert_eq!(success.data["test"], "value");

    let error = ToolResult::error("test error".to_string());
    assert!(!error.success);
    assert_eq!(error.error.as_deref(), Some("test error"));
}

#[test]
fn test_record_wire_format() {
    let record = DocumentRecord {
        id: "01_Bloodwork/2020-01-01-cbc.pdf".to_string(),
        absolute_path: "/docs/01_Bloodwork/2020-01-01-cbc.pdf".into(),
        relative_path: "01_Bloodwork/2020-01-01-cbc.pdf".to_string(),
        filename: "2020-01-01-cbc.pdf".to_string(),
        category: "01_Bloodwork".to_string(),
        category_label: "Bloodwork".to_string(),
        year: Some("2020".to_string()),
    };

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["absolutePath"], "/docs/01_Bloodwork/2020-01-01-cbc.pdf");
    assert_eq!(value["categoryLabel"], "Bloodwork");
    assert_eq!(value["year"], "2020");

    let back: DocumentRecord = serde_json::from_value(value).unwrap();
    assert_eq!(back, record);
}
