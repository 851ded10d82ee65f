//! MCP (Model Context Protocol) server module
//!
//! This module implements a JSON-RPC 2.0 compliant MCP server that
//! exposes Quiver's search and domain operations as MCP tools.

pub mod error;
pub mod handlers;
pub mod pagination;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tools;
pub mod transport;

// Re-export main types
pub use error::McpError;
pub use server::McpServer;
pub use session::SessionContext;
pub use tools::{McpToolHandler, ToolRegistry};
