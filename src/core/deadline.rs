//! Per-request deadlines.
//!
//! Flat scans check the deadline between records so a large scan can
//! be abandoned promptly once the caller's budget is spent.

use crate::core::error::{QuiverError, Result};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never fires
    pub fn none() -> Self {
        Self { at: None }
    }

    /// A deadline `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Fail with `DeadlineExceeded` once the deadline has passed
    pub fn check(&self, operation: &str) -> Result<()> {
        if self.is_expired() {
            return Err(QuiverError::DeadlineExceeded(format!(
                "{operation} did not finish within its time budget"
            )));
        }
        Ok(())
    }
}
