//! Path utilities for URL prefixes and route-root relative paths
//!
//! `is_valid_path`, `normalize_path` and `relative_posix` are pure. The
//! filesystem-facing checks live in [`security`].

use std::borrow::Cow;
use std::path::{Component, Path};

pub mod hierarchy;
pub mod security;

pub use hierarchy::PathHierarchy;
pub use security::SecurityGuard;

/// Validates if a URL path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//` or `\`
/// - Must not end with `/` (except root `/`)
/// - Must not be empty
///
/// # Examples
///
/// ```
/// use trellis_router::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/api/v1"));
///
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("api"));
/// assert!(!is_valid_path("/api/"));
/// assert!(!is_valid_path("/api//v1"));
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalize a URL path to canonical form
///
/// Returns `Cow::Borrowed` when the input is already valid.
///
/// ```
/// use trellis_router::path::normalize_path;
///
/// assert_eq!(normalize_path("api/"), "/api");
/// assert_eq!(normalize_path("\\api\\v1"), "/api/v1");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Normalizes a mount prefix; empty and `/` mean no prefix
///
/// ```
/// use trellis_router::path::normalize_prefix;
///
/// assert_eq!(normalize_prefix("api/"), Some("/api".to_string()));
/// assert_eq!(normalize_prefix("/"), None);
/// assert_eq!(normalize_prefix(""), None);
/// ```
pub fn normalize_prefix(prefix: &str) -> Option<String> {
    match normalize_path(prefix) {
        p if p == "/" => None,
        p => Some(p.into_owned()),
    }
}

/// `path` relative to `root`, with `/` separators and `.` for the root itself
///
/// Returns `None` when `path` is not under `root`.
pub fn relative_posix(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        Some(".".to_string())
    } else {
        Some(parts.join("/"))
    }
}
