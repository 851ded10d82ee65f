// Common test utilities and fixtures

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items
// Note: These may appear unused in some test binaries
#[allow(unused_imports)]
pub use fixtures::{seed_teams, TeamFixture};
#[allow(unused_imports)]
pub use helpers::{
    create_persistent_services, create_test_services, ids, put_prompt, put_resource,
};
