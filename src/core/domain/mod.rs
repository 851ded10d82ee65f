//! Domain management.
//!
//! - **shorthand**: identifier grammar and `domain:local` tokens
//! - **scope**: isolation modes and the per-caller domain context
//! - **registry**: the domain graph and scope resolution

pub mod registry;
pub mod scope;
pub mod shorthand;

pub use registry::{Domain, DomainRegistry, DEFAULT_MAX_DEPTH};
pub use scope::{DomainContext, DomainScope, IsolationMode};
pub use shorthand::{ResolvedId, DEFAULT_DOMAIN};
