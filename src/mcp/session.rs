//! Per-connection state.
//!
//! Each MCP connection carries its own current domain; switching in one
//! session never affects another.

use crate::core::domain::DomainContext;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct SessionContext {
    domain: RwLock<DomainContext>,
}

impl SessionContext {
    pub fn new(ctx: DomainContext) -> Self {
        Self {
            domain: RwLock::new(ctx),
        }
    }

    /// Snapshot of the current domain context
    pub fn context(&self) -> DomainContext {
        match self.domain.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn current(&self) -> String {
        self.context().current().to_string()
    }

    pub fn set(&self, ctx: DomainContext) {
        match self.domain.write() {
            Ok(mut guard) => *guard = ctx,
            Err(poisoned) => *poisoned.into_inner() = ctx,
        }
    }
}
