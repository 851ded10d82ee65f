// Shared catalog fixtures

use super::helpers::{put_prompt, put_resource};
use quiver::core::services::Services;

/// Three-domain layout used across the integration suites:
///
/// ```text
/// default
/// team-a
/// └── team-a-backend
/// team-b
/// ```
#[allow(dead_code)]
pub struct TeamFixture;

#[allow(dead_code)]
impl TeamFixture {
    pub const TEAM_A: &'static str = "team-a";
    pub const BACKEND: &'static str = "team-a-backend";
    pub const TEAM_B: &'static str = "team-b";
}

/// Create the team domains and one record set per domain.
///
/// Every domain holds a resource mentioning "deploy" so scope
/// differences show up in search counts.
#[allow(dead_code)]
pub fn seed_teams(services: &Services) {
    services
        .create_domain(TeamFixture::TEAM_A, "Team A", "Frontend team", None)
        .expect("create team-a");
    services
        .create_domain(
            TeamFixture::BACKEND,
            "Team A Backend",
            "Backend services",
            Some(TeamFixture::TEAM_A),
        )
        .expect("create team-a-backend");
    services
        .create_domain(TeamFixture::TEAM_B, "Team B", "Data team", None)
        .expect("create team-b");

    put_resource(
        services,
        "default",
        "handbook",
        "Engineering handbook",
        "How we work\nWe deploy on Tuesdays\nReviews are required",
        &["process"],
    );
    put_resource(
        services,
        TeamFixture::TEAM_A,
        "ui-guide",
        "UI deploy guide",
        "Build the bundle\nnpm run deploy\nCheck the CDN cache",
        &["frontend", "deploy"],
    );
    put_resource(
        services,
        TeamFixture::BACKEND,
        "api-runbook",
        "API runbook",
        "Restart the api service\ncargo deploy --release\nWatch latency dashboards\nRollback on error",
        &["backend", "ops"],
    );
    put_resource(
        services,
        TeamFixture::TEAM_B,
        "etl-notes",
        "ETL notes",
        "Nightly etl job\nDeploy the scheduler first\nValidate row counts",
        &["data"],
    );
    put_prompt(
        services,
        TeamFixture::TEAM_A,
        "review",
        "Review {{file}} before we deploy, focus on {{focus}}",
    );
}
