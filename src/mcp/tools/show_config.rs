//! Show config tool handler
//!
//! Returns the current configuration of the running quiver-mcp server.

use super::handler::{parse_args, text_content, McpToolHandler};
use crate::core::config::Config;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct ShowConfigHandler {
    config: Arc<Config>,
}

impl ShowConfigHandler {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn format_config(&self) -> String {
        let mut output = String::from("# Quiver MCP Configuration\n\n");

        output.push_str("## Storage\n");
        if self.config.storage.in_memory {
            output.push_str("- **Mode:** in-memory (nothing persisted)\n\n");
        } else {
            output.push_str(&format!(
                "- **Data Directory:** {}\n\n",
                self.config.storage.data_dir.display()
            ));
        }

        output.push_str("## Search\n");
        output.push_str(&format!(
            "- **Default Limit:** {}\n",
            self.config.search.default_limit
        ));
        output.push_str(&format!("- **Max Limit:** {}\n", self.config.search.max_limit));
        output.push_str(&format!(
            "- **Max Query Length:** {}\n",
            self.config.search.max_query_length
        ));
        output.push_str(&format!(
            "- **Snippet Length:** {} chars\n\n",
            self.config.search.snippet_length
        ));

        output.push_str("## Domains\n");
        output.push_str(&format!(
            "- **Default Domain:** {}\n",
            self.config.domains.default_domain
        ));
        output.push_str(&format!(
            "- **Isolation Mode:** {}\n\n",
            self.config.domains.isolation_mode
        ));

        output.push_str("## Limits\n");
        output.push_str(&format!(
            "- **Request Timeout:** {}s\n",
            self.config.limits.request_timeout_sec
        ));

        output
    }

    fn format_config_detailed(&self) -> String {
        let mut output = self.format_config();

        output.push_str("\n## Internals\n");
        output.push_str(&format!(
            "- **Scan Page Size:** {}\n",
            self.config.search.scan_page_size
        ));
        output.push_str(&format!(
            "- **Max Candidates:** {}\n",
            self.config.search.max_candidates
        ));
        output.push_str(&format!(
            "- **Max Domain Depth:** {}\n",
            self.config.domains.max_depth
        ));

        output
    }
}

#[derive(Debug, Deserialize)]
struct ShowConfigArgs {
    #[serde(default)]
    detailed: bool,
}

#[async_trait]
impl McpToolHandler for ShowConfigHandler {
    fn name(&self) -> &str {
        "show_config"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "show_config".to_string(),
            description: "Show the current configuration of the running quiver-mcp server: \
                         storage, search limits, domain isolation and timeouts."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "detailed": {
                        "type": "boolean",
                        "description": "Include scan and candidate window internals",
                        "default": false
                    }
                },
                "required": []
            }),
        }
    }

    async fn execute(&self, args: Value, _session: &SessionContext) -> Result<ToolResult, McpError> {
        let args: ShowConfigArgs = parse_args(args)?;

        let text = if args.detailed {
            self.format_config_detailed()
        } else {
            self.format_config()
        };

        Ok(text_content(text))
    }
}
