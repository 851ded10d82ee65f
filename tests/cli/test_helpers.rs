//! CLI test helpers
//!
//! Arc<Services> wrappers matching CLI execute() signatures.

use crate::common::{seed_teams, TeamFixture};
use quiver::core::domain::DomainContext;
use quiver::core::services::Services;
use std::sync::Arc;

/// Seeded in-memory services plus a context pointing at `current`
pub fn seeded(current: &str) -> (Arc<Services>, DomainContext) {
    let services = crate::common::create_test_services();
    seed_teams(&services);
    (services, DomainContext::new(current))
}

/// Seeded services with the current domain set to team-a
pub fn seeded_team_a() -> (Arc<Services>, DomainContext) {
    seeded(TeamFixture::TEAM_A)
}

/// Run a command body in both output formats
#[allow(dead_code)]
pub const FORMATS: [quiver::cli::OutputFormat; 2] = [
    quiver::cli::OutputFormat::Human,
    quiver::cli::OutputFormat::Json,
];
