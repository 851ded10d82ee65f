//! MCP-specific error types

use crate::core::error::QuiverError;
use crate::mcp::protocol::{
    CONFLICT, DEADLINE_EXCEEDED, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    INVARIANT_VIOLATION, NOT_FOUND, PARSE_ERROR, SEARCH_FAILED,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Tool error (code {0}): {1}")]
    ToolError(i32, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// JSON-RPC code and message for an error reply
    pub fn code_and_message(&self) -> (i32, String) {
        match self {
            McpError::ParseError(msg) => (PARSE_ERROR, msg.clone()),
            McpError::InvalidRequest(msg) => (INVALID_REQUEST, msg.clone()),
            McpError::InvalidParams(msg) => (INVALID_PARAMS, msg.clone()),
            McpError::InternalError(msg) => (INTERNAL_ERROR, msg.clone()),
            McpError::ToolError(code, msg) => (*code, msg.clone()),
            McpError::Io(e) => (INTERNAL_ERROR, format!("I/O error: {e}")),
            McpError::Json(e) => (INTERNAL_ERROR, format!("JSON error: {e}")),
        }
    }
}

impl From<QuiverError> for McpError {
    fn from(err: QuiverError) -> Self {
        if err.is_bad_request() {
            return McpError::InvalidParams(err.to_string());
        }
        if err.is_not_found() {
            return McpError::ToolError(NOT_FOUND, err.to_string());
        }
        if err.is_conflict() {
            return McpError::ToolError(CONFLICT, err.to_string());
        }
        match err {
            QuiverError::InvariantViolation(_) => {
                McpError::ToolError(INVARIANT_VIOLATION, err.to_string())
            }
            QuiverError::DeadlineExceeded(_) => {
                McpError::ToolError(DEADLINE_EXCEEDED, err.to_string())
            }
            QuiverError::IndexError { .. } => McpError::ToolError(SEARCH_FAILED, err.to_string()),
            other => McpError::InternalError(other.to_string()),
        }
    }
}
