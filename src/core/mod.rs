//! Core domain logic (protocol-agnostic)
//!
//! This module contains all business logic that is independent
//! of transport protocols (MCP, CLI).
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Records, query spec and result shapes
//! - **xdg**: XDG directory handling
//! - **deadline**: Per-request time budget
//! - **domain**: Domain registry, isolation scopes, shorthand ids
//! - **storage**: Record store and Tantivy index
//! - **search**: Query compiler, post-processor, orchestrator
//! - **emulation**: grep, find and rg views
//! - **services**: Unified service container

pub mod config;
pub mod deadline;
pub mod domain;
pub mod emulation;
pub mod error;
pub mod search;
pub mod services;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{QuiverError, Result};
pub use services::Services;
