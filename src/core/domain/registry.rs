//! Domain registry.
//!
//! Owns the domain graph and answers scope questions about it.
//! Reads take a shared lock; mutations clone the graph, apply the
//! change, persist the copy (when backed by a file) and only then
//! swap it in, so a failed write never leaves a half-applied change.

use crate::core::domain::scope::{DomainContext, DomainScope, IsolationMode};
use crate::core::domain::shorthand::{validate_domain_id, DEFAULT_DOMAIN};
use crate::core::error::{QuiverError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

/// Default bound on ancestry/descendant walks
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// A named, hierarchical namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Slash-joined ancestry including self
    pub path: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Domain {
    fn root(id: &str, display_name: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            parent_id: None,
            path: id.to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    domains: Vec<Domain>,
}

type DomainMap = BTreeMap<String, Domain>;

/// Registry of domains shared across all requests
pub struct DomainRegistry {
    domains: RwLock<DomainMap>,
    persist_path: Option<PathBuf>,
    max_depth: usize,
}

impl std::fmt::Debug for DomainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainRegistry")
            .field("persist_path", &self.persist_path)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl DomainRegistry {
    /// Create a registry that lives only in memory
    pub fn in_memory(max_depth: usize) -> Self {
        let mut domains = DomainMap::new();
        domains.insert(DEFAULT_DOMAIN.to_string(), default_domain());
        Self {
            domains: RwLock::new(domains),
            persist_path: None,
            max_depth,
        }
    }

    /// Open a file-backed registry, creating it (with the default
    /// domain) if the file does not exist yet
    pub fn open(path: PathBuf, max_depth: usize) -> Result<Self> {
        let mut domains = DomainMap::new();

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let file: RegistryFile = serde_json::from_str(&contents)?;
            for domain in file.domains {
                domains.insert(domain.id.clone(), domain);
            }
        }

        let needs_default = !domains.contains_key(DEFAULT_DOMAIN);
        if needs_default {
            domains.insert(DEFAULT_DOMAIN.to_string(), default_domain());
        }

        let registry = Self {
            domains: RwLock::new(domains),
            persist_path: Some(path),
            max_depth,
        };

        if needs_default {
            let guard = registry.read()?;
            registry.persist(&guard)?;
        }

        Ok(registry)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DomainMap>> {
        self.domains
            .read()
            .map_err(|_| QuiverError::InvariantViolation("domain registry lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DomainMap>> {
        self.domains
            .write()
            .map_err(|_| QuiverError::InvariantViolation("domain registry lock poisoned".into()))
    }

    fn persist(&self, domains: &DomainMap) -> Result<()> {
        if let Some(path) = &self.persist_path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = RegistryFile {
                domains: domains.values().cloned().collect(),
            };
            let json = serde_json::to_string_pretty(&file)?;
            fs::write(path, json)?;
        }
        Ok(())
    }

    /// Apply a mutation to a copy of the graph, persist it, then swap it in
    fn commit<T>(&self, mutate: impl FnOnce(&mut DomainMap) -> Result<T>) -> Result<T> {
        let mut guard = self.write()?;
        let mut next = guard.clone();
        let value = mutate(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(value)
    }

    /// Create a domain, optionally under an existing parent
    pub fn create(
        &self,
        id: &str,
        display_name: &str,
        description: &str,
        parent_id: Option<&str>,
    ) -> Result<Domain> {
        validate_domain_id(id)?;
        let parent_id = parent_id.filter(|p| !p.is_empty());
        let max_depth = self.max_depth;

        let domain = self.commit(|domains| {
            if domains.contains_key(id) {
                return Err(QuiverError::DomainAlreadyExists(id.to_string()));
            }

            let path = match parent_id {
                Some(parent) => {
                    let parent_domain = domains
                        .get(parent)
                        .ok_or_else(|| QuiverError::ParentDomainNotFound(parent.to_string()))?;
                    let depth = walk_ancestry(domains, parent, max_depth)?.len() + 2;
                    if depth > max_depth {
                        return Err(QuiverError::InvalidArgument(format!(
                            "domain '{id}' would be nested {depth} levels deep (maximum {max_depth})"
                        )));
                    }
                    format!("{}/{}", parent_domain.path, id)
                }
                None => id.to_string(),
            };

            let name = if display_name.trim().is_empty() {
                id
            } else {
                display_name
            };
            let mut domain = Domain::root(id, name, description);
            domain.parent_id = parent_id.map(str::to_string);
            domain.path = path;

            domains.insert(id.to_string(), domain.clone());
            Ok(domain)
        })?;

        info!(domain = %domain.id, path = %domain.path, "Created domain");
        Ok(domain)
    }

    /// Get a domain by id
    pub fn get(&self, id: &str) -> Result<Domain> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| QuiverError::DomainNotFound(id.to_string()))
    }

    /// Check whether a domain exists
    pub fn exists(&self, id: &str) -> bool {
        self.read().map(|d| d.contains_key(id)).unwrap_or(false)
    }

    /// Number of known domains
    pub fn len(&self) -> usize {
        self.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// List domains; `None` or an empty filter returns every domain,
    /// otherwise only direct children of the filter id
    pub fn list(&self, parent_filter: Option<&str>) -> Result<Vec<Domain>> {
        let domains = self.read()?;
        let list = match parent_filter.filter(|p| !p.is_empty()) {
            None => domains.values().cloned().collect(),
            Some(parent) => domains
                .values()
                .filter(|d| d.parent_id.as_deref() == Some(parent))
                .cloned()
                .collect(),
        };
        Ok(list)
    }

    /// Ancestor ids ordered root to parent
    pub fn ancestry(&self, id: &str) -> Result<Vec<String>> {
        let domains = self.read()?;
        if !domains.contains_key(id) {
            return Err(QuiverError::DomainNotFound(id.to_string()));
        }
        walk_ancestry(&domains, id, self.max_depth)
    }

    /// Transitive descendant ids, depth-first pre-order
    pub fn descendants(&self, id: &str) -> Result<Vec<String>> {
        let domains = self.read()?;
        if !domains.contains_key(id) {
            return Err(QuiverError::DomainNotFound(id.to_string()));
        }
        walk_descendants(&domains, id, self.max_depth)
    }

    /// Domain ids a search from `id` may read under `mode`
    pub fn searchable_scope(&self, id: &str, mode: IsolationMode) -> Result<BTreeSet<String>> {
        let domains = self.read()?;
        if !domains.contains_key(id) {
            return Err(QuiverError::DomainNotFound(id.to_string()));
        }
        searchable(&domains, id, mode, self.max_depth)
    }

    /// Full scope description for `id`
    pub fn scope(&self, id: &str, mode: IsolationMode) -> Result<DomainScope> {
        let domains = self.read()?;
        if !domains.contains_key(id) {
            return Err(QuiverError::DomainNotFound(id.to_string()));
        }
        Ok(DomainScope {
            current: id.to_string(),
            ancestry: walk_ancestry(&domains, id, self.max_depth)?,
            children: direct_children(&domains, id),
            searchable: searchable(&domains, id, mode, self.max_depth)?,
        })
    }

    /// Produce a context pointing at `id`.
    ///
    /// The registry keeps no "current" pointer; callers hold the
    /// returned context for their own session.
    pub fn switch(&self, id: &str) -> Result<DomainContext> {
        let domain = self.get(id)?;
        if !domain.active {
            return Err(QuiverError::InvalidArgument(format!(
                "domain '{id}' is archived"
            )));
        }
        Ok(DomainContext::new(domain.id))
    }

    /// Soft-deactivate a domain
    pub fn archive(&self, id: &str) -> Result<Domain> {
        if id == DEFAULT_DOMAIN {
            return Err(QuiverError::ProtectedDomain(id.to_string()));
        }
        let domain = self.commit(|domains| {
            let domain = domains
                .get_mut(id)
                .ok_or_else(|| QuiverError::DomainNotFound(id.to_string()))?;
            domain.active = false;
            domain.updated_at = Utc::now();
            Ok(domain.clone())
        })?;

        info!(domain = %id, "Archived domain");
        Ok(domain)
    }

    /// Ids a `delete` would remove, in removal order, without touching
    /// the graph
    pub fn plan_delete(&self, id: &str, cascade: bool) -> Result<Vec<String>> {
        if id == DEFAULT_DOMAIN {
            return Err(QuiverError::ProtectedDomain(id.to_string()));
        }
        let domains = self.read()?;
        deletion_order(&domains, id, cascade, self.max_depth)
    }

    /// Remove a domain; with `cascade`, its descendants go first
    /// (children before parents). Returns the removed ids in removal order.
    pub fn delete(&self, id: &str, cascade: bool) -> Result<Vec<String>> {
        if id == DEFAULT_DOMAIN {
            return Err(QuiverError::ProtectedDomain(id.to_string()));
        }
        let max_depth = self.max_depth;

        let removed = self.commit(|domains| {
            let order = deletion_order(domains, id, cascade, max_depth)?;
            for domain_id in &order {
                domains.remove(domain_id);
            }
            Ok(order)
        })?;

        info!(domain = %id, removed = removed.len(), cascade, "Deleted domain");
        Ok(removed)
    }

    /// Opaque value that changes whenever the graph changes
    pub fn fingerprint(&self) -> Result<String> {
        let domains = self.read()?;
        let latest = domains
            .values()
            .map(|d| d.updated_at.timestamp_millis())
            .max()
            .unwrap_or(0);
        Ok(format!("{}-{}", domains.len(), latest))
    }
}

fn default_domain() -> Domain {
    Domain::root(DEFAULT_DOMAIN, "Default", "Default domain")
}

fn direct_children(domains: &DomainMap, id: &str) -> Vec<String> {
    domains
        .values()
        .filter(|d| d.parent_id.as_deref() == Some(id))
        .map(|d| d.id.clone())
        .collect()
}

/// Walk parent pointers from `id`, returning ancestors root to parent
fn walk_ancestry(domains: &DomainMap, id: &str, max_depth: usize) -> Result<Vec<String>> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(id.to_string());

    let mut current = domains
        .get(id)
        .and_then(|d| d.parent_id.clone());

    while let Some(parent) = current {
        if !visited.insert(parent.clone()) {
            return Err(QuiverError::InvariantViolation(format!(
                "cycle detected in ancestry of '{id}' at '{parent}'"
            )));
        }
        if chain.len() >= max_depth {
            return Err(QuiverError::InvariantViolation(format!(
                "ancestry of '{id}' exceeds maximum depth {max_depth}"
            )));
        }
        let domain = domains.get(&parent).ok_or_else(|| {
            QuiverError::InvariantViolation(format!(
                "domain '{id}' references missing ancestor '{parent}'"
            ))
        })?;
        chain.push(parent);
        current = domain.parent_id.clone();
    }

    chain.reverse();
    Ok(chain)
}

/// Depth-first pre-order walk over children of `id`
fn walk_descendants(domains: &DomainMap, id: &str, max_depth: usize) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(id.to_string());

    let mut stack: Vec<(String, usize)> = direct_children(domains, id)
        .into_iter()
        .rev()
        .map(|c| (c, 1))
        .collect();

    while let Some((child, depth)) = stack.pop() {
        if depth > max_depth {
            return Err(QuiverError::InvariantViolation(format!(
                "descendants of '{id}' exceed maximum depth {max_depth}"
            )));
        }
        if !visited.insert(child.clone()) {
            return Err(QuiverError::InvariantViolation(format!(
                "cycle detected below '{id}' at '{child}'"
            )));
        }
        for grandchild in direct_children(domains, &child).into_iter().rev() {
            stack.push((grandchild, depth + 1));
        }
        out.push(child);
    }

    Ok(out)
}

/// Domains removed by deleting `id`, children before parents
fn deletion_order(
    domains: &DomainMap,
    id: &str,
    cascade: bool,
    max_depth: usize,
) -> Result<Vec<String>> {
    if !domains.contains_key(id) {
        return Err(QuiverError::DomainNotFound(id.to_string()));
    }

    let descendants = walk_descendants(domains, id, max_depth)?;
    if !descendants.is_empty() && !cascade {
        return Err(QuiverError::DomainHasChildren(id.to_string()));
    }

    let mut order = post_order(domains, id, max_depth)?;
    order.retain(|d| d != DEFAULT_DOMAIN);
    Ok(order)
}

/// Post-order removal list: deepest descendants first, `id` last
fn post_order(domains: &DomainMap, id: &str, max_depth: usize) -> Result<Vec<String>> {
    let pre = walk_descendants(domains, id, max_depth)?;
    let mut depth_of: Vec<(usize, String)> = Vec::with_capacity(pre.len());
    for domain in pre {
        let depth = walk_ancestry(domains, &domain, max_depth)?.len();
        depth_of.push((depth, domain));
    }
    // Stable sort keeps siblings in walk order within a level
    depth_of.sort_by(|a, b| b.0.cmp(&a.0));

    let mut order: Vec<String> = depth_of.into_iter().map(|(_, d)| d).collect();
    order.push(id.to_string());
    Ok(order)
}

fn searchable(
    domains: &DomainMap,
    id: &str,
    mode: IsolationMode,
    max_depth: usize,
) -> Result<BTreeSet<String>> {
    let mut scope = BTreeSet::new();
    scope.insert(id.to_string());

    match mode {
        IsolationMode::Strict => {}
        IsolationMode::Shared => scope.extend(domains.keys().cloned()),
        IsolationMode::Hierarchical => {
            scope.extend(walk_ancestry(domains, id, max_depth)?);
            scope.extend(walk_descendants(domains, id, max_depth)?);
        }
    }

    Ok(scope)
}
