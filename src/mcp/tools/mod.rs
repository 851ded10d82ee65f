//! MCP tool implementations
//!
//! This module contains all MCP tool handlers that expose Quiver's
//! search, domain and catalog operations.

pub mod add_prompt;
pub mod add_resource;
pub mod advanced_search;
pub mod archive_domain;
pub mod create_domain;
pub mod delete_domain;
pub mod domain_stats;
pub mod find;
pub mod get_record;
pub mod get_server_info;
pub mod grep;
pub mod handler;
pub mod helpers;
pub mod list_domains;
pub mod registry;
pub mod ripgrep;
pub mod search;
pub mod shorthand;
pub mod show_config;
pub mod switch_domain;

pub use add_prompt::AddPromptHandler;
pub use add_resource::AddResourceHandler;
pub use advanced_search::AdvancedSearchHandler;
pub use archive_domain::ArchiveDomainHandler;
pub use create_domain::CreateDomainHandler;
pub use delete_domain::DeleteDomainHandler;
pub use domain_stats::DomainStatsHandler;
pub use find::FindHandler;
pub use get_record::GetRecordHandler;
pub use get_server_info::GetServerInfoHandler;
pub use grep::GrepHandler;
pub use handler::{parse_args, text_content, McpToolHandler};
pub use helpers::{fence_language, format_bytes, format_line_scan, truncate_text};
pub use list_domains::ListDomainsHandler;
pub use registry::ToolRegistry;
pub use ripgrep::RipgrepHandler;
pub use search::SearchHandler;
pub use shorthand::ShorthandHandler;
pub use show_config::ShowConfigHandler;
pub use switch_domain::SwitchDomainHandler;
