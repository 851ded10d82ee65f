//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a specific CLI command.
//! Command names match MCP tool names (underscores become hyphens in CLI).

pub mod completions;
pub mod config;
pub mod domain;
pub mod find;
pub mod grep;
pub mod info;
pub mod record;
pub mod ripgrep;
pub mod search;
pub mod shorthand;

// Re-export argument types for use in mod.rs
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use find::FindArgs;
pub use grep::GrepArgs;
pub use info::InfoArgs;
pub use ripgrep::RipgrepArgs;
pub use search::{AdvancedSearchArgs, SearchArgs};
pub use shorthand::ShorthandArgs;

/// Parse `key=value` pairs given on the command line
pub(crate) fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}
