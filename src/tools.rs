use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::docshelf::DocShelf;
use crate::error::{DocShelfError, Result};
use crate::types::{DocsFilter, SearchParams};

pub const TOOL_META: &str = "docs:meta";
pub const TOOL_LIST: &str = "docs:list";
pub const TOOL_SEARCH: &str = "docs:search";

/// JSON-schema description of one callable operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// The request/response surface a UI or IPC layer talks to.
pub struct DocumentTools {
    shelf: Arc<DocShelf>,
}

impl DocumentTools {
    pub fn new(shelf: Arc<DocShelf>) -> Self {
        Self { shelf }
    }

    pub fn get_tool_schemas() -> Vec<ToolSchema> {
        let filter_properties = json!({
            "category": {
                "type": "string",
                "description": "Exact category folder name (e.g., '01_Bloodwork')"
            },
            "year": {
                "type": "string",
                "description": "Four-digit year (e.g., '2020')"
            }
        });

        let mut search_properties = filter_properties.clone();
        if let Some(props) = search_properties.as_object_mut() {
            props.insert(
                "q".to_string(),
                json!({
                    "type": "string",
                    "description": "Case-insensitive text matched against filenames, then document content"
                }),
            );
        }

        vec![
            ToolSchema {
                name: TOOL_META.to_string(),
                description: "List the distinct document categories and years".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
            ToolSchema {
                name: TOOL_LIST.to_string(),
                description: "List documents, optionally filtered by category and year".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": filter_properties
                }),
            },
            ToolSchema {
                name: TOOL_SEARCH.to_string(),
                description: "Search documents by filename and extracted PDF text".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": search_properties
                }),
            },
        ]
    }

    pub async fn execute_tool(&self, tool_name: &str, input: Value) -> Result<ToolResult> {
        debug!("Executing tool {}", tool_name);
        match tool_name {
            TOOL_META => self.meta().await,
            TOOL_LIST => self.list(input).await,
            TOOL_SEARCH => self.search(input).await,
            _ => Ok(ToolResult::error(format!("Unknown tool: {}", tool_name))),
        }
    }

    async fn meta(&self) -> Result<ToolResult> {
        let meta = self.shelf.get_meta().await;
        Ok(ToolResult::success(serde_json::to_value(meta)?))
    }

    async fn list(&self, input: Value) -> Result<ToolResult> {
        let filter: DocsFilter = match parse_input(input) {
            Ok(filter) => filter,
            Err(e) => {
                warn!("Treating malformed {} input as matching nothing: {}", TOOL_LIST, e);
                return Ok(ToolResult::success(json!([])));
            }
        };

        let docs = self.shelf.list_docs(&filter).await;
        Ok(ToolResult::success(serde_json::to_value(docs)?))
    }

    async fn search(&self, input: Value) -> Result<ToolResult> {
        let params: SearchParams = match parse_input(input) {
            Ok(params) => params,
            Err(e) => {
                warn!("Treating malformed {} input as matching nothing: {}", TOOL_SEARCH, e);
                return Ok(ToolResult::success(json!([])));
            }
        };

        let docs = self.shelf.search_docs(&params).await;
        Ok(ToolResult::success(serde_json::to_value(docs)?))
    }
}

/// `null` input means "no parameters".
fn parse_input<T: for<'de> Deserialize<'de> + Default>(input: Value) -> Result<T> {
    if input.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(input).map_err(|e| DocShelfError::ToolError(format!("Invalid input: {}", e)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub data: Value,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: json!({}),
            error: Some(message),
        }
    }
}
