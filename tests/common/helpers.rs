// Test helper functions

use quiver::core::config::Config;
use quiver::core::domain::DomainContext;
use quiver::core::services::{PromptInput, ResourceInput, Services};
use quiver::core::types::{Record, SearchResponse};
use std::path::Path;
use std::sync::Arc;

/// In-memory services wrapped in Arc (matching adapter signatures)
#[allow(dead_code)]
pub fn create_test_services() -> Arc<Services> {
    Arc::new(Services::in_memory().expect("Failed to create services"))
}

/// File-backed services rooted at `dir`
#[allow(dead_code)]
pub fn create_persistent_services(dir: &Path) -> Services {
    let mut config = Config::default();
    config.storage.data_dir = dir.to_path_buf();
    Services::new(config).expect("Failed to open services")
}

/// Store a plain-text resource in `domain`
#[allow(dead_code)]
pub fn put_resource(
    services: &Services,
    domain: &str,
    id: &str,
    name: &str,
    content: &str,
    tags: &[&str],
) -> Record {
    services
        .put_resource(
            ResourceInput {
                id: id.to_string(),
                name: name.to_string(),
                content: content.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                ..ResourceInput::default()
            },
            &DomainContext::new(domain),
        )
        .expect("Failed to store resource")
}

/// Store a prompt template in `domain`
#[allow(dead_code)]
pub fn put_prompt(services: &Services, domain: &str, id: &str, template: &str) -> Record {
    services
        .put_prompt(
            PromptInput {
                id: id.to_string(),
                template: template.to_string(),
                ..PromptInput::default()
            },
            &DomainContext::new(domain),
        )
        .expect("Failed to store prompt")
}

/// Shorthand tokens of a search response, sorted
#[allow(dead_code)]
pub fn ids(response: &SearchResponse) -> Vec<String> {
    let mut ids: Vec<String> = response
        .results
        .iter()
        .map(|r| r.shorthand.clone())
        .collect();
    ids.sort();
    ids
}
