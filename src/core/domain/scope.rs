//! Isolation modes, resolved scopes and the per-caller domain context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::shorthand::DEFAULT_DOMAIN;

/// How far a search may reach beyond the caller's domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationMode {
    /// The domain itself only
    Strict,
    /// Every known domain
    Shared,
    /// The domain, its ancestors and its descendants
    #[default]
    Hierarchical,
}

impl IsolationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationMode::Strict => "strict",
            IsolationMode::Shared => "shared",
            IsolationMode::Hierarchical => "hierarchical",
        }
    }
}

impl fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IsolationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(IsolationMode::Strict),
            "shared" => Ok(IsolationMode::Shared),
            "hierarchical" => Ok(IsolationMode::Hierarchical),
            other => Err(format!(
                "unknown isolation mode '{other}'. Must be 'strict', 'shared' or 'hierarchical'"
            )),
        }
    }
}

/// Scope derived from the current domain graph. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainScope {
    pub current: String,
    /// Ordered root to parent
    pub ancestry: Vec<String>,
    /// Direct children
    pub children: Vec<String>,
    pub searchable: BTreeSet<String>,
}

/// The domain a caller operates in when it omits one.
///
/// Held per session by the adapters and threaded through every
/// operation; the registry never stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainContext {
    current: String,
}

impl DomainContext {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }
}

impl Default for DomainContext {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN)
    }
}
