//! MCP protocol method handlers

use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::*;
use crate::mcp::session::SessionContext;
use crate::mcp::tools::{
    AddPromptHandler, AddResourceHandler, AdvancedSearchHandler, ArchiveDomainHandler,
    CreateDomainHandler, DeleteDomainHandler, DomainStatsHandler, FindHandler, GetRecordHandler,
    GetServerInfoHandler, GrepHandler, ListDomainsHandler, RipgrepHandler, SearchHandler,
    ShorthandHandler, ShowConfigHandler, SwitchDomainHandler, ToolRegistry,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Handlers for one MCP connection.
///
/// The session (current domain) lives here, so every connection gets
/// its own.
pub struct ProtocolHandlers {
    initialized: AtomicBool,
    tool_registry: ToolRegistry,
    session: SessionContext,
}

impl ProtocolHandlers {
    pub fn new(services: Arc<Services>) -> Self {
        let mut registry = ToolRegistry::new();

        // Search
        registry.register(Arc::new(SearchHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(AdvancedSearchHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(GrepHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(FindHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(RipgrepHandler::new(Arc::clone(&services))));

        // Domains
        registry.register(Arc::new(CreateDomainHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(ListDomainsHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(SwitchDomainHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(ArchiveDomainHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(DeleteDomainHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(DomainStatsHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(ShorthandHandler::new(Arc::clone(&services))));

        // Catalog
        registry.register(Arc::new(AddResourceHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(AddPromptHandler::new(Arc::clone(&services))));
        registry.register(Arc::new(GetRecordHandler::new(Arc::clone(&services))));

        // Server
        registry.register(Arc::new(GetServerInfoHandler::new()));
        registry.register(Arc::new(ShowConfigHandler::new(Arc::clone(
            &services.config,
        ))));

        Self {
            initialized: AtomicBool::new(false),
            tool_registry: registry,
            session: SessionContext::new(services.default_context()),
        }
    }

    /// Session state of this connection
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Handle initialize request
    pub async fn handle_initialize(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params: InitializeParams =
            serde_json::from_value(request.params.unwrap_or(Value::Null)).unwrap_or_default();

        info!(
            client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
            protocol = %params.protocol_version,
            "Client initialized"
        );

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: "quiver-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(
            request.id,
            serde_json::to_value(result)?,
        ))
    }

    /// Handle initialized notification
    pub async fn handle_initialized(
        &self,
        _request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        self.initialized.store(true, Ordering::SeqCst);
        info!("Server initialized");

        // Initialized is a notification, no response needed
        Ok(JsonRpcResponse::none())
    }

    /// Handle tools/list request
    pub async fn handle_tools_list(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let tools = self.tool_registry.list();
        Ok(JsonRpcResponse::success(request.id, json!({ "tools": tools })))
    }

    /// Handle tools/call request
    pub async fn handle_tools_call(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params_value = match request.params.clone() {
            Some(v) => v,
            None => {
                return Ok(JsonRpcResponse::failure(
                    request.id,
                    INVALID_PARAMS,
                    "Missing params".to_string(),
                ));
            }
        };

        let params: ToolCallParams = match serde_json::from_value(params_value) {
            Ok(p) => p,
            Err(e) => {
                return Ok(JsonRpcResponse::failure(
                    request.id,
                    INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                ));
            }
        };

        let handler = match self.tool_registry.get(&params.name) {
            Some(h) => h,
            None => {
                return Ok(JsonRpcResponse::failure(
                    request.id,
                    INVALID_REQUEST,
                    format!("Tool not found: {}", params.name),
                ));
            }
        };

        debug!(tool = %params.name, domain = %self.session.current(), "Dispatching tool");
        match handler.execute(params.arguments, &self.session).await {
            Ok(result) => Ok(JsonRpcResponse::success(
                request.id,
                serde_json::to_value(result)?,
            )),
            Err(e) => {
                let (code, message) = e.code_and_message();
                debug!(tool = %params.name, code, error = %message, "Tool failed");
                Ok(JsonRpcResponse::failure(request.id, code, message))
            }
        }
    }

    /// Handle ping request
    pub async fn handle_ping(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        Ok(JsonRpcResponse::success(request.id, json!({})))
    }
}
