//! HTTP cache validation module
//!
//! `ETag` generation and `If-None-Match` handling for static assets.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Cache-Control for regular assets
pub const ASSET_CACHE_CONTROL: &str = "public, max-age=3600";

/// Cache-Control for HTML entry pages, which must be revalidated on every visit
pub const HTML_CACHE_CONTROL: &str = "no-cache";

/// Generate a strong `ETag` from content length and hash, e.g. `"1a-9f3c..."`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Uses weak comparison: a `W/` prefix on the client side is ignored.
/// Supports comma-separated lists and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
        })
    })
}

/// Pick the Cache-Control value for a Content-Type
pub fn cache_control_for(content_type: &str) -> &'static str {
    if content_type.starts_with("text/html") {
        HTML_CACHE_CONTROL
    } else {
        ASSET_CACHE_CONTROL
    }
}
