//! `grep` over stored records.
//!
//! A flat scan: every in-scope record body is read line by line so
//! line numbers and context are exact.

use crate::core::deadline::Deadline;
use crate::core::emulation::scan::{
    FlatScan, LineCollector, LineMatcher, LinePredicate, LineShape, MaxCountScope, OutputMode,
    ScanStrategy,
};
use crate::core::error::{QuiverError, Result};
use crate::core::storage::RecordStore;
use crate::core::types::{LineScanResponse, RecordKind};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::info;

/// grep flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GrepOptions {
    pub pattern: String,
    /// `-i`
    pub ignore_case: bool,
    /// `-v`
    pub invert_match: bool,
    /// `-w`
    pub whole_words: bool,
    /// `-E`
    pub extended: bool,
    /// `-F`, wins over `extended`
    pub fixed: bool,
    /// `-o`
    pub only_matching: bool,
    /// `-c`
    pub count: bool,
    /// `-m`, a cap across the whole scan
    pub max_count: Option<usize>,
    /// `-C`
    pub context: usize,
    /// `-B`, defaults to `context`
    pub before: Option<usize>,
    /// `-A`, defaults to `context`
    pub after: Option<usize>,
    /// Only records carrying any of these tags
    pub tags: Vec<String>,
    #[serde(alias = "type")]
    pub kind: Option<RecordKind>,
    /// Explicit domains instead of the caller's scope
    pub domains: Vec<String>,
}

impl GrepOptions {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.pattern.is_empty() {
            return Err(QuiverError::InvalidArgument(
                "grep pattern cannot be empty".to_string(),
            ));
        }
        if self.only_matching && self.invert_match {
            return Err(QuiverError::InvalidArgument(
                "only-matching cannot be combined with invert-match".to_string(),
            ));
        }
        if self.max_count == Some(0) {
            return Err(QuiverError::InvalidArgument(
                "max-count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn predicate(&self) -> Result<LinePredicate> {
        if self.fixed || !self.extended {
            return Ok(LineMatcher::literal(
                &self.pattern,
                self.ignore_case,
                self.whole_words,
            ));
        }

        let source = if self.whole_words {
            format!(r"\b(?:{})\b", self.pattern)
        } else {
            self.pattern.clone()
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(self.ignore_case)
            .build()
            .map_err(|e| QuiverError::pattern(&self.pattern, e))?;
        Ok(LinePredicate::Pattern(regex))
    }

    fn shape(&self) -> LineShape {
        LineShape {
            output: if self.count {
                OutputMode::Count
            } else {
                OutputMode::Lines
            },
            before: self.before.unwrap_or(self.context),
            after: self.after.unwrap_or(self.context),
            only_matching: self.only_matching,
            max_count: self.max_count,
            max_scope: MaxCountScope::Global,
        }
    }
}

/// Run grep over the records of `scope`
pub fn grep(
    store: &RecordStore,
    scope: &BTreeSet<String>,
    options: &GrepOptions,
    page_size: usize,
    deadline: &Deadline,
) -> Result<LineScanResponse> {
    let start = Instant::now();
    options.validate()?;
    let matcher = LineMatcher::new(options.predicate()?, options.invert_match);

    let mut collector = LineCollector::new(options.shape());
    let stats = FlatScan::new(store, scope, page_size)
        .kind(options.kind)
        .tags(&options.tags)
        .scan(deadline, &mut |record| collector.visit(record, &matcher))?;

    let (output, truncated) = collector.finish();
    let response = LineScanResponse {
        pattern: options.pattern.clone(),
        output,
        records_scanned: stats.scanned,
        skipped: stats.skipped,
        truncated,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        pattern = %options.pattern,
        scanned = stats.scanned,
        matches = response.match_total(),
        "grep completed"
    );
    Ok(response)
}
