//! Ranked search over the full-text index.
//!
//! - [`compiler`] lowers a [`SearchQuerySpec`](crate::core::types::SearchQuerySpec)
//!   into a Tantivy query plus an optional verifier
//! - [`postprocess`] shapes hits into results and holds the text
//!   utilities shared with the CLI views
//! - [`service`] orchestrates scope, paging and execution

pub mod compiler;
pub mod postprocess;
mod service;

pub use compiler::{detect_mode, ExecutableQuery, Page, QueryCompiler, QueryPlan};
pub use postprocess::{ShapeOptions, TermMatcher};
pub use service::SearchService;
