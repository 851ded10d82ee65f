//! Error types and error handling for the Quiver search service.
//!
//! This module defines the error types used throughout the
//! application. Protocol-specific error handling (MCP error codes)
//! is handled in the respective adapter modules.

use thiserror::Error;

/// Result type alias for Quiver operations
pub type Result<T> = std::result::Result<T, QuiverError>;

/// Main error type for the Quiver service
#[derive(Error, Debug)]
pub enum QuiverError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid domain id '{0}': expected 2-64 lowercase alphanumerics, '-' or '_', not starting or ending with a separator")]
    InvalidDomainId(String),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    #[error("Parent domain not found: {0}")]
    ParentDomainNotFound(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error("Domain already exists: {0}")]
    DomainAlreadyExists(String),

    #[error("Domain '{0}' is protected and cannot be archived or deleted")]
    ProtectedDomain(String),

    #[error("Domain '{0}' has child domains; delete with cascade to remove them")]
    DomainHasChildren(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("Index error: {context}: {source}")]
    IndexError {
        context: String,
        #[source]
        source: tantivy::TantivyError,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl QuiverError {
    /// Wrap a tantivy failure, keeping the original cause attached
    pub fn index(context: impl Into<String>, source: tantivy::TantivyError) -> Self {
        QuiverError::IndexError {
            context: context.into(),
            source,
        }
    }

    /// Build an invalid-pattern error from any displayable compile failure
    pub fn pattern(pattern: &str, err: impl std::fmt::Display) -> Self {
        QuiverError::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    }

    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            QuiverError::DomainNotFound(_)
                | QuiverError::ParentDomainNotFound(_)
                | QuiverError::ResourceNotFound(_)
                | QuiverError::PromptNotFound(_)
        )
    }

    /// Check if this is a conflict error (already exists, protected domain)
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            QuiverError::DomainAlreadyExists(_)
                | QuiverError::ProtectedDomain(_)
                | QuiverError::DomainHasChildren(_)
        )
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            QuiverError::InvalidArgument(_)
                | QuiverError::InvalidDomainId(_)
                | QuiverError::InvalidPattern { .. }
                | QuiverError::ConfigError(_)
        )
    }

    /// Check if this error indicates a corrupted domain graph
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, QuiverError::InvariantViolation(_))
    }
}
