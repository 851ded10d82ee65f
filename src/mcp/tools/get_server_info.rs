//! Get server info tool handler
//!
//! Returns version and build information about the running quiver-mcp server.

use super::handler::{text_content, McpToolHandler};
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema, PROTOCOL_VERSION};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde_json::{json, Value};

const TOOLS: &[(&str, &str)] = &[
    ("search", "Plain search with automatic mode detection"),
    ("advanced_search", "Search with explicit mode, filters and sorting"),
    ("grep", "Exact line scan over record bodies"),
    ("find", "Find records by name, type, tags and size"),
    ("ripgrep", "rg over the ranked index"),
    ("create_domain", "Create a domain"),
    ("list_domains", "List domains (paginated)"),
    ("switch_domain", "Change this session's current domain"),
    ("archive_domain", "Deactivate a domain"),
    ("delete_domain", "Delete a domain and its records"),
    ("domain_stats", "Record counts for a domain"),
    ("shorthand", "Resolve or build record tokens"),
    ("add_resource", "Create or replace a resource"),
    ("add_prompt", "Create or replace a prompt"),
    ("get_record", "Fetch a record or render a prompt"),
    ("get_server_info", "Show server version (this tool)"),
    ("show_config", "Show current configuration"),
];

pub struct GetServerInfoHandler;

impl Default for GetServerInfoHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl GetServerInfoHandler {
    pub fn new() -> Self {
        Self
    }

    fn format_info(&self) -> String {
        let version = env!("CARGO_PKG_VERSION");
        let rust_version = env!("CARGO_PKG_RUST_VERSION");

        let mut output = String::from("# Quiver MCP Server Information\n\n");

        output.push_str("## Version\n");
        output.push_str(&format!("- **Version:** {version}\n"));
        output.push_str(&format!("- **Rust Version:** {rust_version}\n\n"));

        output.push_str("## Server Details\n");
        output.push_str("- **Name:** quiver-mcp\n");
        output.push_str("- **Description:** Domain-scoped search over resources and prompts\n");
        output.push_str(&format!("- **Protocol:** MCP {PROTOCOL_VERSION}\n\n"));

        output.push_str("## Available Tools\n");
        for (name, summary) in TOOLS {
            output.push_str(&format!("- {name}: {summary}\n"));
        }

        output
    }
}

#[async_trait]
impl McpToolHandler for GetServerInfoHandler {
    fn name(&self) -> &str {
        "get_server_info"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_server_info".to_string(),
            description: "Get version and build information about the running quiver-mcp server. \
                         Returns server version, protocol version and available tools."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    async fn execute(&self, _args: Value, _session: &SessionContext) -> Result<ToolResult, McpError> {
        Ok(text_content(self.format_info()))
    }
}
