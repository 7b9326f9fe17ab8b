//! HTTP cache control module
//!
//! `ETag` generation, conditional request matching and `Cache-Control`
//! policies for proxied responses.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate `ETag` using fast hashing
///
/// Returns a quoted `ETag` string, e.g. `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, a comma-separated list, weak validators
/// (`W/"abc"`) and the `*` wildcard. Returns true when a 304 should be sent.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Cache-Control policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Public, never revalidated within max-age (seconds)
    Immutable(u32),
    /// Must revalidate before reuse
    #[default]
    NoCache,
    /// No store
    NoStore,
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Immutable(max_age) => format!("public, max-age={max_age}, immutable"),
            Self::NoCache => "no-cache".to_string(),
            Self::NoStore => "no-store".to_string(),
        }
    }
}
