//! Cursor-based pagination for MCP tools
//!
//! Provides opaque cursors for list_domains pagination. Cursors are
//! base64-encoded JSON containing an offset and a registry fingerprint
//! so cursors are rejected once the domain set has changed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Cursor for paginating list_domains results.
///
/// Encoded as URL-safe base64 JSON and passed as an opaque string
/// to the MCP client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainCursor {
    /// Number of domains already returned
    pub offset: usize,
    /// Registry fingerprint when the cursor was issued
    pub fingerprint: String,
}

impl DomainCursor {
    pub fn new(offset: usize, fingerprint: impl Into<String>) -> Self {
        Self {
            offset,
            fingerprint: fingerprint.into(),
        }
    }

    /// Encode cursor as URL-safe base64
    pub fn encode(&self) -> String {
        let json = serde_json::json!({
            "offset": self.offset,
            "fingerprint": self.fingerprint,
        })
        .to_string();
        URL_SAFE_NO_PAD.encode(json.as_bytes())
    }

    /// Decode cursor from URL-safe base64
    pub fn decode(encoded: &str) -> Result<Self, String> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| format!("Invalid cursor encoding: {e}"))?;

        let json = String::from_utf8(bytes).map_err(|e| format!("Invalid cursor UTF-8: {e}"))?;

        serde_json::from_str(&json).map_err(|e| format!("Invalid cursor format: {e}"))
    }

    /// Reject the cursor if the registry changed since it was issued
    pub fn verify(&self, current_fingerprint: &str) -> Result<(), String> {
        if self.fingerprint != current_fingerprint {
            return Err("Cursor is stale (domains changed since it was issued). \
                 Start from the first page by omitting the cursor."
                .to_string());
        }
        Ok(())
    }
}
