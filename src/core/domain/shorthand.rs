//! Identifier grammar and shorthand resource notation.
//!
//! A shorthand token packs `(domain, local_id)` into one string:
//!
//! - `::local` addresses the default domain
//! - `domain:local` addresses any other domain
//! - `domain:<id>:<local>` is the legacy triple form, still accepted
//! - a bare `local` resolves against the caller's context domain

use crate::core::error::{QuiverError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Id of the domain that always exists
pub const DEFAULT_DOMAIN: &str = "default";

/// Maximum length of a record's local id
pub const MAX_LOCAL_ID_LEN: usize = 128;

const LEGACY_PREFIX: &str = "domain:";

static DOMAIN_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9](?:[a-z0-9_-]{0,62}[a-z0-9])$").unwrap());

/// Check a domain id against the identifier grammar.
///
/// Lowercase alphanumerics plus `-`/`_`, 2-64 chars, no leading or
/// trailing separator.
pub fn is_valid_domain_id(id: &str) -> bool {
    DOMAIN_ID_PATTERN.is_match(id)
}

/// Validate a domain id, returning `InvalidDomainId` on failure
pub fn validate_domain_id(id: &str) -> Result<()> {
    if is_valid_domain_id(id) {
        Ok(())
    } else {
        Err(QuiverError::InvalidDomainId(id.to_string()))
    }
}

/// Validate a record's local id.
///
/// Local ids may not contain `:` or whitespace, which keeps
/// `parse(build(d, l)) == (d, l)` total.
pub fn validate_local_id(local: &str) -> Result<()> {
    if local.is_empty() {
        return Err(QuiverError::InvalidArgument(
            "record id cannot be empty".to_string(),
        ));
    }
    if local.chars().count() > MAX_LOCAL_ID_LEN {
        return Err(QuiverError::InvalidArgument(format!(
            "record id '{local}' exceeds {MAX_LOCAL_ID_LEN} characters"
        )));
    }
    if local.contains(':') || local.chars().any(char::is_whitespace) {
        return Err(QuiverError::InvalidArgument(format!(
            "record id '{local}' may not contain ':' or whitespace"
        )));
    }
    Ok(())
}

/// A shorthand token resolved into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    pub domain: String,
    pub local_id: String,
}

impl ResolvedId {
    fn new(domain: &str, local_id: &str) -> Self {
        Self {
            domain: domain.to_string(),
            local_id: local_id.to_string(),
        }
    }
}

/// Parse a shorthand token.
///
/// `context_domain` is used for bare tokens. Precedence:
/// `::local`, then the legacy triple, then `domain:local`, then bare.
pub fn parse(token: &str, context_domain: &str) -> Result<ResolvedId> {
    let token = token.trim();
    if token.is_empty() {
        return Err(QuiverError::InvalidArgument(
            "shorthand token cannot be empty".to_string(),
        ));
    }

    if let Some(local) = token.strip_prefix("::") {
        validate_local_id(local)?;
        return Ok(ResolvedId::new(DEFAULT_DOMAIN, local));
    }

    if let Some(rest) = token.strip_prefix(LEGACY_PREFIX) {
        if let Some((domain, local)) = rest.split_once(':') {
            validate_domain_id(domain)?;
            validate_local_id(local)?;
            return Ok(ResolvedId::new(domain, local));
        }
    }

    if let Some((domain, local)) = token.split_once(':') {
        if domain.is_empty() {
            return Err(QuiverError::InvalidArgument(format!(
                "malformed shorthand '{token}': use '::{local}' for the default domain"
            )));
        }
        validate_domain_id(domain)?;
        validate_local_id(local)?;
        return Ok(ResolvedId::new(domain, local));
    }

    validate_local_id(token)?;
    Ok(ResolvedId::new(context_domain, token))
}

/// Build a shorthand token.
///
/// Emits `::local` for the default (or empty) domain, `domain:local`
/// otherwise.
pub fn build(domain: &str, local_id: &str) -> Result<String> {
    validate_local_id(local_id)?;
    if domain.is_empty() || domain == DEFAULT_DOMAIN {
        return Ok(format!("::{local_id}"));
    }
    validate_domain_id(domain)?;
    Ok(format!("{domain}:{local_id}"))
}
