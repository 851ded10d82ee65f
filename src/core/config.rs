//! Configuration management for the Quiver search service.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::domain::scope::IsolationMode;
use crate::core::domain::shorthand::{is_valid_domain_id, DEFAULT_DOMAIN};
use crate::core::error::{QuiverError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub domains: DomainsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding `domains.json` and `records.json`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Keep everything in memory and never touch disk
    #[serde(default)]
    pub in_memory: bool,
}

/// Search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Page size used when the caller omits a limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper clamp for any requested limit
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Maximum query string length
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Snippet window in characters
    #[serde(default = "default_snippet_length")]
    pub snippet_length: usize,

    /// Page size for flat scans over the record store
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: usize,

    /// Index candidates inspected when a query needs verification
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

/// Domain configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainsConfig {
    /// Domain new sessions start in
    #[serde(default = "default_domain")]
    pub default_domain: String,

    /// Isolation mode applied when a request does not name one
    #[serde(default)]
    pub isolation_mode: IsolationMode,

    /// Bound on ancestry/descendant walks
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Limits configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_sec: u64,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_limit() -> usize {
    20
}

fn default_max_limit() -> usize {
    100
}

fn default_max_query_length() -> usize {
    1000
}

fn default_snippet_length() -> usize {
    200
}

fn default_scan_page_size() -> usize {
    1000
}

fn default_max_candidates() -> usize {
    10_000
}

fn default_domain() -> String {
    crate::core::domain::DEFAULT_DOMAIN.to_string()
}

fn default_max_depth() -> usize {
    crate::core::domain::DEFAULT_MAX_DEPTH
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            in_memory: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            max_query_length: default_max_query_length(),
            snippet_length: default_snippet_length(),
            scan_page_size: default_scan_page_size(),
            max_candidates: default_max_candidates(),
        }
    }
}

impl Default for DomainsConfig {
    fn default() -> Self {
        Self {
            default_domain: default_domain(),
            isolation_mode: IsolationMode::default(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_sec: default_request_timeout(),
        }
    }
}

impl LimitsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_sec)
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| QuiverError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// In-memory configuration with defaults, used by tests and benches
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.storage.in_memory = true;
        config
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// This method uses XDG Base Directory specification for file locations.
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. QUIVER_CONFIG env var
    /// 2. XDG config file (~/.config/quiver/config.toml)
    /// 3. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("QUIVER_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else {
                Self::default()
            }
        };

        // Use the XDG data directory unless a location was chosen explicitly
        if env::var("QUIVER_DATA_DIR").is_err() && config.storage.data_dir == default_data_dir() {
            config.storage.data_dir = xdg.data_dir.clone();
        }

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Storage configuration
        if let Ok(data_dir) = env::var("QUIVER_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(in_memory) = env::var("QUIVER_IN_MEMORY") {
            if let Ok(flag) = in_memory.parse() {
                self.storage.in_memory = flag;
            }
        }

        // Search configuration
        if let Ok(limit) = env::var("QUIVER_DEFAULT_LIMIT") {
            if let Ok(l) = limit.parse() {
                self.search.default_limit = l;
            }
        }
        if let Ok(max_limit) = env::var("QUIVER_MAX_LIMIT") {
            if let Ok(l) = max_limit.parse() {
                self.search.max_limit = l;
            }
        }
        if let Ok(max_query_len) = env::var("QUIVER_MAX_QUERY_LENGTH") {
            if let Ok(len) = max_query_len.parse() {
                self.search.max_query_length = len;
            }
        }
        if let Ok(snippet) = env::var("QUIVER_SNIPPET_LENGTH") {
            if let Ok(len) = snippet.parse() {
                self.search.snippet_length = len;
            }
        }
        if let Ok(page) = env::var("QUIVER_SCAN_PAGE_SIZE") {
            if let Ok(size) = page.parse() {
                self.search.scan_page_size = size;
            }
        }
        if let Ok(candidates) = env::var("QUIVER_MAX_CANDIDATES") {
            if let Ok(n) = candidates.parse() {
                self.search.max_candidates = n;
            }
        }

        // Domain configuration
        if let Ok(domain) = env::var("QUIVER_DEFAULT_DOMAIN") {
            self.domains.default_domain = domain;
        }
        if let Ok(mode) = env::var("QUIVER_ISOLATION_MODE") {
            match mode.parse() {
                Ok(m) => self.domains.isolation_mode = m,
                Err(e) => tracing::warn!("Ignoring QUIVER_ISOLATION_MODE: {e}"),
            }
        }
        if let Ok(depth) = env::var("QUIVER_MAX_DEPTH") {
            if let Ok(d) = depth.parse() {
                self.domains.max_depth = d;
            }
        }

        // Limits configuration
        if let Ok(timeout) = env::var("QUIVER_REQUEST_TIMEOUT_SEC") {
            if let Ok(t) = timeout.parse() {
                self.limits.request_timeout_sec = t;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.search.default_limit == 0 {
            return Err(QuiverError::ConfigError(
                "Default limit must be non-zero".to_string(),
            ));
        }

        if self.search.default_limit > self.search.max_limit {
            return Err(QuiverError::ConfigError(
                "Default limit cannot exceed max limit".to_string(),
            ));
        }

        if self.search.max_query_length == 0 {
            return Err(QuiverError::ConfigError(
                "Max query length must be non-zero".to_string(),
            ));
        }

        if self.search.snippet_length == 0 {
            return Err(QuiverError::ConfigError(
                "Snippet length must be non-zero".to_string(),
            ));
        }

        if self.search.scan_page_size == 0 {
            return Err(QuiverError::ConfigError(
                "Scan page size must be non-zero".to_string(),
            ));
        }

        if self.search.max_candidates < self.search.max_limit {
            return Err(QuiverError::ConfigError(
                "Max candidates cannot be smaller than max limit".to_string(),
            ));
        }

        if !is_valid_domain_id(&self.domains.default_domain) {
            return Err(QuiverError::ConfigError(format!(
                "Default domain '{}' is not a valid domain id",
                self.domains.default_domain
            )));
        }

        // `::id` tokens and the archive/delete guards are tied to this id
        if self.domains.default_domain != DEFAULT_DOMAIN {
            return Err(QuiverError::ConfigError(format!(
                "Default domain must be '{DEFAULT_DOMAIN}', got '{}'",
                self.domains.default_domain
            )));
        }

        if self.domains.max_depth == 0 {
            return Err(QuiverError::ConfigError(
                "Max domain depth must be non-zero".to_string(),
            ));
        }

        if self.limits.request_timeout_sec == 0 {
            return Err(QuiverError::ConfigError(
                "Request timeout must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Path of the persisted domain registry
    pub fn domains_file(&self) -> PathBuf {
        self.storage.data_dir.join("domains.json")
    }

    /// Path of the persisted record store
    pub fn records_file(&self) -> PathBuf {
        self.storage.data_dir.join("records.json")
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Data dir: {:?}", self.storage.data_dir);
        tracing::info!("  In memory: {}", self.storage.in_memory);
        tracing::info!("  Default limit: {}", self.search.default_limit);
        tracing::info!("  Max limit: {}", self.search.max_limit);
        tracing::info!("  Max query length: {}", self.search.max_query_length);
        tracing::info!("  Snippet length: {} chars", self.search.snippet_length);
        tracing::info!("  Max candidates: {}", self.search.max_candidates);
        tracing::info!("  Default domain: {}", self.domains.default_domain);
        tracing::info!("  Isolation mode: {}", self.domains.isolation_mode);
        tracing::info!("  Max depth: {}", self.domains.max_depth);
        tracing::info!("  Request timeout: {}s", self.limits.request_timeout_sec);
    }
}
