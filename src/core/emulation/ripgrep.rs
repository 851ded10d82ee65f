//! `rg` over the index.
//!
//! Unlike grep this takes the ranked path: the pattern is compiled into
//! an index query, the hits are loaded in rank order and their lines
//! are matched and shaped the same way grep's are.

use crate::core::deadline::Deadline;
use crate::core::domain::DomainRegistry;
use crate::core::emulation::find::{domain_paths, virtual_path};
use crate::core::emulation::scan::{
    LineCollector, LineMatcher, LinePredicate, LineShape, MaxCountScope, OutputMode, RankedScan,
    ScanStrategy,
};
use crate::core::error::{QuiverError, Result};
use crate::core::search::compiler::tokens;
use crate::core::search::{SearchService, TermMatcher};
use crate::core::storage::RecordStore;
use crate::core::types::{LineScanResponse, SearchMode, SearchQuerySpec};
use glob::Pattern;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::ControlFlow;
use std::time::Instant;
use tracing::info;

/// rg flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RipgrepOptions {
    pub pattern: String,
    /// `-s`; ignored when `smart_case` is set
    pub case_sensitive: bool,
    /// `-S`: case-sensitive only if the pattern has an uppercase letter
    pub smart_case: bool,
    /// `-F`
    pub fixed_strings: bool,
    /// `-U`
    pub multiline: bool,
    /// `-w`
    pub word_regexp: bool,
    /// `-g`, matched against the virtual path or the id
    pub glob: Option<String>,
    /// `-m`, per record
    pub max_count: Option<usize>,
    /// `-c`
    pub count: bool,
    /// `-l`
    pub files_with_matches: bool,
    /// `-C`
    pub context: usize,
    pub before: Option<usize>,
    pub after: Option<usize>,
    /// Explicit domains instead of the caller's scope
    pub domains: Vec<String>,
}

impl RipgrepOptions {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    /// Mode the pattern is compiled in
    pub fn mode(&self) -> SearchMode {
        if self.fixed_strings {
            SearchMode::Exact
        } else if self.multiline {
            SearchMode::Regex
        } else {
            SearchMode::Smart
        }
    }

    pub fn is_case_sensitive(&self) -> bool {
        if self.smart_case {
            self.pattern.chars().any(char::is_uppercase)
        } else {
            self.case_sensitive
        }
    }

    /// Query spec handed to the compiler
    pub fn to_spec(&self) -> SearchQuerySpec {
        SearchQuerySpec {
            raw_text: self.pattern.clone(),
            mode: self.mode(),
            case_sensitive: self.is_case_sensitive(),
            whole_words: self.word_regexp,
            multiline: self.multiline,
            domains: self.domains.clone(),
            ..SearchQuerySpec::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(QuiverError::InvalidArgument(
                "rg pattern cannot be empty".to_string(),
            ));
        }
        if self.count && self.files_with_matches {
            return Err(QuiverError::InvalidArgument(
                "count cannot be combined with files-with-matches".to_string(),
            ));
        }
        if self.max_count == Some(0) {
            return Err(QuiverError::InvalidArgument(
                "max-count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn shape(&self) -> LineShape {
        LineShape {
            output: if self.count {
                OutputMode::Count
            } else if self.files_with_matches {
                OutputMode::Files
            } else {
                OutputMode::Lines
            },
            before: self.before.unwrap_or(self.context),
            after: self.after.unwrap_or(self.context),
            only_matching: false,
            max_count: self.max_count,
            max_scope: MaxCountScope::PerRecord,
        }
    }

    /// Line predicate for a compiled query's matcher
    fn predicate(&self, matcher: &TermMatcher) -> Result<LinePredicate> {
        let case_sensitive = self.is_case_sensitive();
        if self.fixed_strings {
            return Ok(LineMatcher::literal(
                &self.pattern,
                !case_sensitive,
                self.word_regexp,
            ));
        }

        match matcher {
            TermMatcher::Pattern(regex) => Ok(LinePredicate::Pattern(regex.clone())),
            TermMatcher::Terms(_) => {
                let words = tokens(&self.pattern);
                if words.is_empty() {
                    return Ok(LinePredicate::AnyTerm(matcher.clone()));
                }
                let alternation = words
                    .iter()
                    .map(|w| regex::escape(w))
                    .collect::<Vec<_>>()
                    .join("|");
                let source = if self.word_regexp {
                    format!(r"\b(?:{alternation})\b")
                } else {
                    alternation
                };
                let regex = RegexBuilder::new(&source)
                    .case_insensitive(!case_sensitive)
                    .build()
                    .map_err(|e| QuiverError::pattern(&self.pattern, e))?;
                Ok(LinePredicate::Pattern(regex))
            }
        }
    }
}

/// Run rg over the ranked hits within `scope`
pub fn ripgrep(
    search: &SearchService,
    registry: &DomainRegistry,
    store: &RecordStore,
    scope: &BTreeSet<String>,
    options: &RipgrepOptions,
    max_candidates: usize,
    deadline: &Deadline,
) -> Result<LineScanResponse> {
    let start = Instant::now();
    options.validate()?;
    let glob = options
        .glob
        .as_deref()
        .filter(|g| !g.is_empty())
        .map(|g| Pattern::new(g).map_err(|e| QuiverError::pattern(g, e)))
        .transpose()?;

    let scan = RankedScan::prepare(search, store, &options.to_spec(), scope, max_candidates)?;
    let matcher = LineMatcher::new(options.predicate(scan.matcher())?, false);
    let paths = domain_paths(registry, scope);

    let mut collector = LineCollector::new(options.shape());
    let stats = scan.scan(deadline, &mut |record| {
        if let Some(glob) = &glob {
            let domain_path = paths
                .get(record.domain())
                .map(String::as_str)
                .unwrap_or(record.domain());
            let path = virtual_path(domain_path, record);
            if !glob.matches(&path) && !glob.matches(record.id()) {
                return ControlFlow::Continue(());
            }
        }
        collector.visit(record, &matcher)
    })?;

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
        "rg completed"
    );
    Ok(response)
}
