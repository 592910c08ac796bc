//! Path prefix matching and rewriting.
//!
//! # Responsibilities
//! - Test whether a request path belongs to a route (anchored prefix)
//! - Rewrite a matched path for the backend (strip prefix, join target base)
//!
//! # Design Decisions
//! - Matching is anchored, case-sensitive, and literal
//! - No regex to guarantee O(path length) matching
//! - The empty remainder after stripping is valid and maps to the target base

/// Returns true if `path` starts with `prefix`.
pub fn prefix_matches(prefix: &str, path: &str) -> bool {
    path.starts_with(prefix)
}

/// Strip `prefix` from the front of `path` and join the remainder onto
/// `base`, the target URL's own path.
pub fn rewrite_path(prefix: &str, base: &str, path: &str) -> String {
    let remainder = path.strip_prefix(prefix).unwrap_or(path);
    join_paths(base, remainder)
}

fn join_paths(base: &str, remainder: &str) -> String {
    let base = base.trim_end_matches('/');
    let joined = if remainder.is_empty() {
        base.to_string()
    } else if remainder.starts_with('/') {
        format!("{base}{remainder}")
    } else {
        format!("{base}/{remainder}")
    };
    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}
