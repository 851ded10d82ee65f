//! Search orchestrator.
//!
//! Resolves the scope a request may read, clamps paging, compiles the
//! spec, runs it against the index and hands the hits to the
//! post-processor.

use crate::core::config::SearchConfig;
use crate::core::domain::{DomainContext, DomainRegistry, IsolationMode};
use crate::core::error::{QuiverError, Result};
use crate::core::search::compiler::{ExecutableQuery, Page, QueryCompiler};
use crate::core::search::postprocess::{self, ShapeOptions};
use crate::core::storage::{HitWindow, QuiverIndex, RawHit};
use crate::core::types::{SearchMode, SearchQuerySpec, SearchResponse};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Ranked search over the index
pub struct SearchService {
    registry: Arc<DomainRegistry>,
    index: Arc<QuiverIndex>,
    compiler: QueryCompiler,
    config: SearchConfig,
    isolation: IsolationMode,
}

impl SearchService {
    pub fn new(
        registry: Arc<DomainRegistry>,
        index: Arc<QuiverIndex>,
        config: SearchConfig,
        isolation: IsolationMode,
    ) -> Self {
        let compiler = QueryCompiler::new(*index.fields());
        Self {
            registry,
            index,
            compiler,
            config,
            isolation,
        }
    }

    /// Default isolation mode used when a caller does not pick one
    pub fn isolation(&self) -> IsolationMode {
        self.isolation
    }

    /// Plain search: smart mode, retried once as fuzzy when the default
    /// query finds nothing
    pub fn search(
        &self,
        spec: &SearchQuerySpec,
        ctx: &DomainContext,
        isolation: Option<IsolationMode>,
    ) -> Result<SearchResponse> {
        let start = Instant::now();
        let spec = spec.clone().with_mode(SearchMode::Smart);
        self.validate(&spec)?;
        let scope = self.resolve_scope(&spec.domains, ctx, isolation.unwrap_or(self.isolation))?;

        let response = self.run(&spec, &scope, start)?;
        if response.results.is_empty()
            && response.mode == SearchMode::Smart
            && !spec.raw_text.trim().is_empty()
        {
            debug!(query = %spec.raw_text, "No hits, retrying as fuzzy");
            let fuzzy = spec.with_mode(SearchMode::Fuzzy);
            return self.run(&fuzzy, &scope, start);
        }
        Ok(response)
    }

    /// Search honouring the requested mode verbatim
    pub fn advanced_search(&self, spec: &SearchQuerySpec, ctx: &DomainContext) -> Result<SearchResponse> {
        let start = Instant::now();
        self.validate(spec)?;
        let scope = self.resolve_scope(&spec.domains, ctx, self.isolation)?;
        self.run(spec, &scope, start)
    }

    /// Compile `spec` and fetch up to `limit` verified hits from the
    /// start of the ranking, without shaping
    pub fn candidates(
        &self,
        spec: &SearchQuerySpec,
        scope: &BTreeSet<String>,
        limit: usize,
    ) -> Result<(ExecutableQuery, Vec<RawHit>)> {
        self.validate(spec)?;
        let page = Page {
            limit: limit.clamp(1, self.config.max_candidates),
            offset: 0,
        };
        let exec = self.compiler.compile(spec, Some(scope), page)?;
        let hits = self.execute(&exec)?;
        Ok((exec, hits))
    }

    /// Domains a request may read: the explicit `domains` list when
    /// given, otherwise the registry scope of the context domain
    pub fn resolve_scope(
        &self,
        domains: &[String],
        ctx: &DomainContext,
        isolation: IsolationMode,
    ) -> Result<BTreeSet<String>> {
        if domains.is_empty() {
            return self.registry.searchable_scope(ctx.current(), isolation);
        }
        domains
            .iter()
            .map(|id| {
                if self.registry.exists(id) {
                    Ok(id.clone())
                } else {
                    Err(QuiverError::DomainNotFound(id.clone()))
                }
            })
            .collect()
    }

    /// Clamp `limit` into `[1, max_limit]` (unset or zero means the
    /// default) and reject offsets past the candidate window
    pub fn page(&self, spec: &SearchQuerySpec) -> Result<Page> {
        if spec.offset > self.config.max_candidates {
            return Err(QuiverError::InvalidArgument(format!(
                "offset {} exceeds the maximum of {}",
                spec.offset, self.config.max_candidates
            )));
        }
        let limit = match spec.limit {
            None | Some(0) => self.config.default_limit,
            Some(n) => n,
        };
        Ok(Page {
            limit: limit.clamp(1, self.config.max_limit),
            offset: spec.offset,
        })
    }

    fn validate(&self, spec: &SearchQuerySpec) -> Result<()> {
        let length = spec.raw_text.chars().count();
        if length > self.config.max_query_length {
            return Err(QuiverError::InvalidArgument(format!(
                "query is {length} characters, the maximum is {}",
                self.config.max_query_length
            )));
        }
        Ok(())
    }

    fn run(&self, spec: &SearchQuerySpec, scope: &BTreeSet<String>, start: Instant) -> Result<SearchResponse> {
        let page = self.page(spec)?;
        let exec = self.compiler.compile(spec, Some(scope), page)?;
        let hits = self.execute(&exec)?;

        let options = ShapeOptions {
            snippet_length: match spec.snippet_length {
                0 => self.config.snippet_length,
                n => n,
            },
            context_lines: spec.context_lines,
        };
        let results = postprocess::process(hits, &exec.matcher, spec, options);

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            query = %spec.raw_text,
            mode = %exec.mode,
            scope = scope.len(),
            results = results.len(),
            duration_ms,
            "Search completed"
        );

        Ok(SearchResponse {
            query: spec.raw_text.clone(),
            mode: exec.mode,
            scope: scope.iter().cloned().collect(),
            count: results.len(),
            results,
            duration_ms,
        })
    }

    fn execute(&self, exec: &ExecutableQuery) -> Result<Vec<RawHit>> {
        let window = HitWindow {
            limit: exec.page.limit,
            offset: exec.page.offset,
            max_candidates: self.config.max_candidates,
        };
        let accept: &dyn Fn(&RawHit) -> bool = &|hit| exec.accepts(hit);
        let accept = exec.verifier.is_some().then_some(accept);
        self.index
            .execute(exec.query.as_ref(), window, exec.highlight, accept)
    }
}
