//! Containment checks for everything the walker follows or loads

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, RoutingError};

/// Guards traversal against escaping the route root
///
/// A path is rejected when it contains a `..` component, or when its
/// canonical form (symlinks resolved) lies outside the canonical root.
#[derive(Debug, Clone)]
pub struct SecurityGuard {
    root: PathBuf,
}

impl SecurityGuard {
    /// Canonicalizes `root`; it must exist and be a directory
    pub fn new(root: &Path) -> Result<Self> {
        let metadata = fs::metadata(root)
            .map_err(|e| RoutingError::discovery(root, format!("cannot access root: {e}")))?;
        if !metadata.is_dir() {
            return Err(RoutingError::discovery(root, "root is not a directory"));
        }
        let root = root
            .canonicalize()
            .map_err(|e| RoutingError::discovery(root, format!("cannot resolve root: {e}")))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the canonical form of `path` when it stays inside the root
    pub fn check(&self, path: &Path) -> Result<PathBuf> {
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(self.escape(path));
        }

        let resolved = path.canonicalize().map_err(|e| {
            RoutingError::discovery(path, format!("cannot resolve path: {e}"))
        })?;

        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(self.escape(path))
        }
    }

    fn escape(&self, path: &Path) -> RoutingError {
        RoutingError::PathTraversal {
            path: path.to_path_buf(),
            root: self.root.clone(),
        }
    }
}
