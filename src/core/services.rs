//! Unified service container for Quiver
//!
//! Provides shared access to all core services. Catalog writes go
//! through here so the record store and the index never drift apart.

use crate::core::config::Config;
use crate::core::deadline::Deadline;
use crate::core::domain::shorthand::{self, validate_local_id, ResolvedId};
use crate::core::domain::{Domain, DomainContext, DomainRegistry, IsolationMode};
use crate::core::emulation::{self, FindOptions, GrepOptions, RipgrepOptions};
use crate::core::error::{QuiverError, Result};
use crate::core::search::SearchService;
use crate::core::storage::{QuiverIndex, RecordKey, RecordStore};
use crate::core::types::{
    DomainStats, FindResponse, LineScanResponse, Prompt, Record, RecordKind, Resource,
    SearchQuerySpec, SearchResponse,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

/// `{{ name }}` placeholder in a prompt template
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_\-]+)\s*\}\}").unwrap());

/// Variables referenced by a template, in first-use order
pub fn template_variables(template: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    PLACEHOLDER
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Resource to create or replace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceInput {
    pub id: String,
    /// Target domain; the caller's context when absent
    pub domain: Option<String>,
    pub name: String,
    pub description: String,
    pub content: String,
    pub content_type: Option<String>,
    pub tags: Vec<String>,
}

/// Prompt to create or replace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptInput {
    pub id: String,
    pub domain: Option<String>,
    pub name: String,
    pub description: String,
    pub template: String,
    /// Declared variables; taken from the template when empty
    pub variables: Vec<String>,
    pub tags: Vec<String>,
}

/// Unified services container
///
/// All adapters use this same struct for service access.
#[derive(Clone)]
pub struct Services {
    /// Domain graph
    pub registry: Arc<DomainRegistry>,

    /// Resources and prompts
    pub store: Arc<RecordStore>,

    /// Full-text index mirroring the store
    pub index: Arc<QuiverIndex>,

    /// Ranked search
    pub search: Arc<SearchService>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration, rebuilding the index from
    /// the record store
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let max_depth = config.domains.max_depth;
        let (registry, store) = if config.storage.in_memory {
            (DomainRegistry::in_memory(max_depth), RecordStore::in_memory())
        } else {
            (
                DomainRegistry::open(config.domains_file(), max_depth)?,
                RecordStore::open(config.records_file())?,
            )
        };

        let index = QuiverIndex::in_ram()?;
        let records = store.all()?;
        index.index_batch(&records)?;
        info!(records = records.len(), domains = registry.len(), "Index rebuilt");

        let registry = Arc::new(registry);
        let index = Arc::new(index);
        let search = Arc::new(SearchService::new(
            Arc::clone(&registry),
            Arc::clone(&index),
            config.search.clone(),
            config.domains.isolation_mode,
        ));

        Ok(Self {
            registry,
            store: Arc::new(store),
            index,
            search,
            config: Arc::new(config),
        })
    }

    /// Services with nothing persisted
    pub fn in_memory() -> Result<Self> {
        Self::new(Config::in_memory())
    }

    /// Context a new session starts in
    pub fn default_context(&self) -> DomainContext {
        DomainContext::new(self.config.domains.default_domain.clone())
    }

    fn deadline(&self) -> Deadline {
        Deadline::after(self.config.limits.request_timeout())
    }

    // Catalog

    /// Create or replace a resource
    pub fn put_resource(&self, input: ResourceInput, ctx: &DomainContext) -> Result<Record> {
        let now = Utc::now();
        let record = Record::Resource(Resource {
            domain: input.domain.unwrap_or_else(|| ctx.current().to_string()),
            name: if input.name.is_empty() {
                input.id.clone()
            } else {
                input.name
            },
            id: input.id,
            description: input.description,
            content: input.content,
            content_type: input
                .content_type
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "text/plain".to_string()),
            tags: input.tags,
            created_at: now,
            updated_at: now,
        });
        self.put_record(record)
    }

    /// Create or replace a prompt
    pub fn put_prompt(&self, input: PromptInput, ctx: &DomainContext) -> Result<Record> {
        let now = Utc::now();
        let variables = if input.variables.is_empty() {
            template_variables(&input.template)
        } else {
            input.variables
        };
        let record = Record::Prompt(Prompt {
            domain: input.domain.unwrap_or_else(|| ctx.current().to_string()),
            name: if input.name.is_empty() {
                input.id.clone()
            } else {
                input.name
            },
            id: input.id,
            description: input.description,
            template: input.template,
            variables,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        });
        self.put_record(record)
    }

    /// Store and index a record, keeping `created_at` of a replaced one
    pub fn put_record(&self, mut record: Record) -> Result<Record> {
        validate_local_id(record.id())?;
        let domain = self.registry.get(record.domain())?;
        if !domain.active {
            return Err(QuiverError::InvalidArgument(format!(
                "domain '{}' is archived",
                domain.id
            )));
        }

        match self.store.get(record.domain(), Some(record.kind()), record.id()) {
            Ok(previous) => record.set_created_at(previous.created_at()),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let previous = self.store.put(record.clone())?;
        if let Err(e) = self.index.index_document(&record) {
            // Keep the store in step with the index
            let key = RecordKey::of(&record);
            let rollback = match previous {
                Some(prev) => self.store.put(prev).map(|_| ()),
                None => self.store.delete(&key).map(|_| ()),
            };
            if let Err(rollback) = rollback {
                warn!(key = %key.as_term(), error = %rollback, "Rollback after index failure failed");
            }
            return Err(e);
        }

        info!(
            domain = %record.domain(),
            id = %record.id(),
            kind = %record.kind(),
            "Stored record"
        );
        Ok(record)
    }

    /// Fetch a record by shorthand token
    pub fn get_record(&self, token: &str, ctx: &DomainContext) -> Result<Record> {
        let resolved = shorthand::parse(token, ctx.current())?;
        self.store.get(&resolved.domain, None, &resolved.local_id)
    }

    /// Delete a record by shorthand token
    pub fn delete_record(&self, token: &str, ctx: &DomainContext) -> Result<Record> {
        let record = self.get_record(token, ctx)?;
        let key = RecordKey::of(&record);
        self.store.delete(&key)?;
        self.index.delete_document(&key)?;
        info!(key = %key.as_term(), "Deleted record");
        Ok(record)
    }

    /// Substitute `{{name}}` placeholders of a prompt
    pub fn render_prompt(
        &self,
        token: &str,
        args: &BTreeMap<String, String>,
        ctx: &DomainContext,
    ) -> Result<String> {
        let resolved = shorthand::parse(token, ctx.current())?;
        let record = self
            .store
            .get(&resolved.domain, Some(RecordKind::Prompt), &resolved.local_id)?;
        let Record::Prompt(prompt) = record else {
            return Err(QuiverError::PromptNotFound(token.to_string()));
        };

        let missing: Vec<&str> = prompt
            .variables
            .iter()
            .filter(|v| !args.contains_key(v.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(QuiverError::InvalidArgument(format!(
                "missing prompt variables: {}",
                missing.join(", ")
            )));
        }

        Ok(PLACEHOLDER
            .replace_all(&prompt.template, |caps: &regex::Captures| {
                args.get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned())
    }

    // Domains

    pub fn create_domain(
        &self,
        id: &str,
        name: &str,
        description: &str,
        parent: Option<&str>,
    ) -> Result<Domain> {
        self.registry.create(id, name, description, parent)
    }

    pub fn list_domains(&self, parent: Option<&str>) -> Result<Vec<Domain>> {
        self.registry.list(parent)
    }

    pub fn switch_domain(&self, id: &str) -> Result<DomainContext> {
        self.registry.switch(id)
    }

    pub fn archive_domain(&self, id: &str) -> Result<Domain> {
        self.registry.archive(id)
    }

    /// Delete a domain (and with `cascade` its descendants) together
    /// with the records stored in it
    pub fn delete_domain(&self, id: &str, cascade: bool) -> Result<Vec<String>> {
        // Records are removed before the graph entry
        let planned = self.registry.plan_delete(id, cascade)?;
        for domain in &planned {
            let records = self.store.delete_domain(domain)?;
            let keys: Vec<RecordKey> = records.iter().map(RecordKey::of).collect();
            self.index.delete_documents(&keys)?;
            info!(domain = %domain, records = keys.len(), "Removed domain records");
        }
        self.registry.delete(id, cascade)
    }

    pub fn domain_stats(&self, id: &str) -> Result<DomainStats> {
        let domain = self.registry.get(id)?;
        let scope = self
            .registry
            .searchable_scope(id, self.config.domains.isolation_mode)?;
        Ok(DomainStats {
            resources: self.store.count(id, RecordKind::Resource)?,
            prompts: self.store.count(id, RecordKind::Prompt)?,
            children: self.registry.list(Some(id))?.len(),
            descendants: self.registry.descendants(id)?.len(),
            scope_size: scope.len(),
            path: domain.path,
            active: domain.active,
            domain: domain.id,
        })
    }

    pub fn resolve_shorthand(&self, token: &str, ctx: &DomainContext) -> Result<ResolvedId> {
        shorthand::parse(token, ctx.current())
    }

    pub fn build_shorthand(&self, domain: &str, local_id: &str) -> Result<String> {
        shorthand::build(domain, local_id)
    }

    // Search

    pub fn search(
        &self,
        spec: &SearchQuerySpec,
        ctx: &DomainContext,
        isolation: Option<IsolationMode>,
    ) -> Result<SearchResponse> {
        self.search.search(spec, ctx, isolation)
    }

    pub fn advanced_search(&self, spec: &SearchQuerySpec, ctx: &DomainContext) -> Result<SearchResponse> {
        self.search.advanced_search(spec, ctx)
    }

    pub fn grep(&self, options: &GrepOptions, ctx: &DomainContext) -> Result<LineScanResponse> {
        let scope = self.scope(&options.domains, ctx)?;
        emulation::grep(
            &self.store,
            &scope,
            options,
            self.config.search.scan_page_size,
            &self.deadline(),
        )
    }

    pub fn find(&self, options: &FindOptions, ctx: &DomainContext) -> Result<FindResponse> {
        let scope = self.scope(&options.domains, ctx)?;
        let limit = match options.limit {
            None | Some(0) => self.config.search.default_limit,
            Some(n) => n.min(self.config.search.max_limit),
        };
        emulation::find(
            &self.registry,
            &self.store,
            &scope,
            options,
            limit,
            self.config.search.scan_page_size,
            &self.deadline(),
        )
    }

    pub fn ripgrep(&self, options: &RipgrepOptions, ctx: &DomainContext) -> Result<LineScanResponse> {
        let scope = self.scope(&options.domains, ctx)?;
        emulation::ripgrep(
            &self.search,
            &self.registry,
            &self.store,
            &scope,
            options,
            self.config.search.max_candidates,
            &self.deadline(),
        )
    }

    fn scope(&self, domains: &[String], ctx: &DomainContext) -> Result<BTreeSet<String>> {
        self.search
            .resolve_scope(domains, ctx, self.config.domains.isolation_mode)
    }
}
