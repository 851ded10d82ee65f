//! Record store for resources and prompts.
//!
//! Records live in memory keyed by `(domain, kind, id)` and are
//! optionally written through to a pretty-printed `records.json`.
//! Entries that fail to decode on load are kept verbatim as malformed
//! entries: scans skip them, `get` reports them, and they are written
//! back untouched so no data is lost.

use crate::core::error::{QuiverError, Result};
use crate::core::types::{Record, RecordKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Unique address of a record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub domain: String,
    pub kind: RecordKind,
    pub id: String,
}

impl RecordKey {
    pub fn new(domain: impl Into<String>, kind: RecordKind, id: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            kind,
            id: id.into(),
        }
    }

    pub fn of(record: &Record) -> Self {
        Self::new(record.domain(), record.kind(), record.id())
    }

    /// Flat string form used as the index's unique term
    pub fn as_term(&self) -> String {
        format!("{}/{}/{}", self.domain, self.kind, self.id)
    }
}

/// A persisted entry that could not be decoded
#[derive(Debug, Clone)]
pub struct MalformedEntry {
    pub raw: Value,
    pub reason: String,
}

impl MalformedEntry {
    /// Best-effort domain of the entry, if the raw JSON carries one
    pub fn domain(&self) -> Option<&str> {
        self.raw.get("domain").and_then(Value::as_str)
    }

    fn id(&self) -> Option<&str> {
        self.raw.get("id").and_then(Value::as_str)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    records: BTreeMap<RecordKey, Record>,
    malformed: Vec<MalformedEntry>,
}

#[derive(Serialize, Deserialize)]
struct StoreFile {
    records: Vec<Value>,
}

/// In-memory record store with optional write-through persistence
pub struct RecordStore {
    state: RwLock<StoreState>,
    persist_path: Option<PathBuf>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("persist_path", &self.persist_path)
            .finish()
    }
}

impl RecordStore {
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            persist_path: None,
        }
    }

    /// Open a file-backed store; a missing file starts empty
    pub fn open(path: PathBuf) -> Result<Self> {
        let mut state = StoreState::default();

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&contents)?;
            for raw in file.records {
                match serde_json::from_value::<Record>(raw.clone()) {
                    Ok(record) => {
                        state.records.insert(RecordKey::of(&record), record);
                    }
                    Err(e) => {
                        warn!(reason = %e, "Keeping malformed record entry");
                        state.malformed.push(MalformedEntry {
                            raw,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            debug!(
                records = state.records.len(),
                malformed = state.malformed.len(),
                "Loaded record store"
            );
        }

        Ok(Self {
            state: RwLock::new(state),
            persist_path: Some(path),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| QuiverError::StorageError("record store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| QuiverError::StorageError("record store lock poisoned".into()))
    }

    fn persist(&self, state: &StoreState) -> Result<()> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut records = Vec::with_capacity(state.records.len() + state.malformed.len());
        for record in state.records.values() {
            records.push(serde_json::to_value(record)?);
        }
        records.extend(state.malformed.iter().map(|m| m.raw.clone()));

        let json = serde_json::to_string_pretty(&StoreFile { records })?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Get a record; `kind = None` looks for a resource first, then a prompt
    pub fn get(&self, domain: &str, kind: Option<RecordKind>, id: &str) -> Result<Record> {
        let state = self.read()?;
        let kinds = match kind {
            Some(k) => vec![k],
            None => vec![RecordKind::Resource, RecordKind::Prompt],
        };

        for k in &kinds {
            if let Some(record) = state.records.get(&RecordKey::new(domain, *k, id)) {
                return Ok(record.clone());
            }
        }

        if let Some(entry) = state
            .malformed
            .iter()
            .find(|m| m.domain() == Some(domain) && m.id() == Some(id))
        {
            return Err(QuiverError::StorageError(format!(
                "record '{domain}:{id}' is malformed: {}",
                entry.reason
            )));
        }

        let token = format!("{domain}:{id}");
        Err(match kind {
            Some(RecordKind::Prompt) => QuiverError::PromptNotFound(token),
            _ => QuiverError::ResourceNotFound(token),
        })
    }

    /// List records in key order, optionally restricted to a set of
    /// domains and a kind
    pub fn list(
        &self,
        domains: Option<&BTreeSet<String>>,
        kind: Option<RecordKind>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Record>> {
        let state = self.read()?;
        Ok(state
            .records
            .iter()
            .filter(|(key, _)| domains.map_or(true, |d| d.contains(&key.domain)))
            .filter(|(key, _)| kind.map_or(true, |k| key.kind == k))
            .skip(offset)
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect())
    }

    /// Malformed entries whose domain is in scope (or unknown)
    pub fn malformed_in(&self, domains: Option<&BTreeSet<String>>) -> Result<Vec<MalformedEntry>> {
        let state = self.read()?;
        Ok(state
            .malformed
            .iter()
            .filter(|m| match (domains, m.domain()) {
                (Some(scope), Some(domain)) => scope.contains(domain),
                _ => true,
            })
            .cloned()
            .collect())
    }

    /// Insert or replace a record, returning the previous version
    pub fn put(&self, record: Record) -> Result<Option<Record>> {
        let mut state = self.write()?;
        let key = RecordKey::of(&record);
        let previous = state.records.insert(key.clone(), record);
        if let Err(e) = self.persist(&state) {
            match previous.clone() {
                Some(prev) => state.records.insert(key, prev),
                None => state.records.remove(&key),
            };
            return Err(e);
        }
        Ok(previous)
    }

    /// Remove a record, returning it if it existed
    pub fn delete(&self, key: &RecordKey) -> Result<Option<Record>> {
        let mut state = self.write()?;
        let removed = state.records.remove(key);
        if let Some(record) = &removed {
            if let Err(e) = self.persist(&state) {
                state.records.insert(key.clone(), record.clone());
                return Err(e);
            }
        }
        Ok(removed)
    }

    /// Remove every record belonging to `domain`
    pub fn delete_domain(&self, domain: &str) -> Result<Vec<Record>> {
        let mut state = self.write()?;
        let keys: Vec<RecordKey> = state
            .records
            .keys()
            .filter(|k| k.domain == domain)
            .cloned()
            .collect();
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let removed: Vec<Record> = keys
            .iter()
            .filter_map(|k| state.records.remove(k))
            .collect();
        if let Err(e) = self.persist(&state) {
            for record in &removed {
                state.records.insert(RecordKey::of(record), record.clone());
            }
            return Err(e);
        }
        Ok(removed)
    }

    /// Every valid record, for index rebuilds
    pub fn all(&self) -> Result<Vec<Record>> {
        Ok(self.read()?.records.values().cloned().collect())
    }

    /// Number of records of `kind` in `domain`
    pub fn count(&self, domain: &str, kind: RecordKind) -> Result<usize> {
        Ok(self
            .read()?
            .records
            .keys()
            .filter(|k| k.domain == domain && k.kind == kind)
            .count())
    }

    pub fn len(&self) -> usize {
        self.read().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
