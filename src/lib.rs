//! Quiver - domain-scoped search over resources and prompts
//!
//! Stores short documents ("resources") and templated prompts in
//! hierarchical domains and retrieves them through ranked search, a
//! multi-mode query compiler and grep/find/rg style views.
//!
//! # Architecture
//!
//! The codebase is organized into three main modules:
//!
//! - **core**: Domain logic (protocol-agnostic)
//!   - config, error, types, xdg, deadline
//!   - domain (registry, scopes, shorthand ids)
//!   - storage (record store, Tantivy index)
//!   - search (compiler, post-processor, orchestrator)
//!   - emulation (grep, find, rg)
//!   - services (unified service container)
//!
//! - **mcp**: MCP adapter (depends on core)
//!   - server, tools, protocol
//!
//! - **cli**: Command-line adapter (depends on core)

// Core domain logic (protocol-agnostic)
pub mod core;

// MCP (Model Context Protocol) adapter
pub mod mcp;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::domain::{Domain, DomainContext, IsolationMode};
pub use core::error::{QuiverError, Result};
pub use core::services::Services;
pub use core::types::*;
