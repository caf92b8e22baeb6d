//! Recursive scan of a route tree
//!
//! The walker only records where route and middleware files are and what
//! segment lineage leads to them. Loading happens later, after filtering.
//! A directory name that cannot be part of a URL only fails the scan when a
//! route file sits somewhere below it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use crate::error::{Result, RoutingError, SegmentError};
use crate::path::{relative_posix, SecurityGuard};
use crate::route::{Segment, MAX_OPTIONAL_SEGMENTS};

/// Directory names never inspected
const SKIPPED_DIRS: [&str; 2] = ["target", "__pycache__"];

/// A directory holding a route file
#[derive(Debug, Clone)]
pub struct RouteSite {
    /// Directory, relative to the root (`.` for the root)
    pub relative: String,
    pub route_file: PathBuf,
    /// Classified directory names from the root down to this directory
    pub segments: Vec<Segment>,
    /// Middleware files of this directory and its ancestors, root first
    pub middleware_files: Vec<PathBuf>,
}

/// A directory holding a middleware file
#[derive(Debug, Clone)]
pub struct MiddlewareSite {
    pub relative: String,
    pub file: PathBuf,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub routes: Vec<RouteSite>,
    pub middleware: Vec<MiddlewareSite>,
}

/// State inherited by each directory from its parent
///
/// Every recursive call owns its own copy; children never see siblings'
/// additions.
#[derive(Clone, Default)]
struct Lineage {
    segments: Vec<Segment>,
    middleware_files: Vec<PathBuf>,
    /// Canonical directories on the current branch
    visited: Vec<PathBuf>,
    /// First directory on the branch that cannot be part of a URL
    unroutable: Option<Unroutable>,
}

impl Lineage {
    fn catch_all(&self) -> Option<&Segment> {
        self.segments.iter().find(|s| s.kind.is_catch_all())
    }

    fn optional_count(&self) -> usize {
        self.segments.iter().filter(|s| s.kind.is_optional()).count()
    }

    /// Classifies a child directory name against this lineage
    fn classify(&self, name: &str) -> std::result::Result<Segment, SegmentError> {
        if let Some(catch_all) = self.catch_all() {
            return Err(SegmentError::AfterCatchAll {
                segment: name.to_string(),
                catch_all: catch_all.original.clone(),
            });
        }

        let segment = Segment::parse(name)?;
        if segment.kind.is_optional() && self.optional_count() >= MAX_OPTIONAL_SEGMENTS {
            return Err(SegmentError::TooManyOptional {
                segment: name.to_string(),
                max: MAX_OPTIONAL_SEGMENTS,
            });
        }
        Ok(segment)
    }
}

/// A directory name that failed classification
///
/// Only fatal once a route file turns up somewhere below it.
#[derive(Clone)]
struct Unroutable {
    path: PathBuf,
    error: SegmentError,
}

impl Unroutable {
    fn into_error(self) -> RoutingError {
        RoutingError::PathParse {
            path: self.path,
            source: self.error,
        }
    }
}

pub struct TreeWalker<'a> {
    guard: &'a SecurityGuard,
    route_file: &'a str,
    middleware_file: &'a str,
}

impl<'a> TreeWalker<'a> {
    pub fn new(guard: &'a SecurityGuard, route_file: &'a str, middleware_file: &'a str) -> Self {
        Self {
            guard,
            route_file,
            middleware_file,
        }
    }

    /// Scans the tree under the guard's root
    ///
    /// Entries are visited in name order, so the outcome is deterministic.
    pub fn scan(&self) -> Result<ScanOutcome> {
        let root = self.guard.root().to_path_buf();
        let lineage = Lineage {
            visited: vec![root.clone()],
            ..Lineage::default()
        };

        let mut outcome = ScanOutcome::default();
        self.visit(&root, lineage, &mut outcome)?;
        Ok(outcome)
    }

    fn visit(&self, dir: &Path, mut lineage: Lineage, out: &mut ScanOutcome) -> Result<()> {
        let relative = relative_posix(self.guard.root(), dir)
            .ok_or_else(|| RoutingError::discovery(dir, "directory is outside the root"))?;

        let middleware_file = dir.join(self.middleware_file);
        if middleware_file.is_file() {
            self.guard.check(&middleware_file)?;
            if lineage.unroutable.is_none() {
                lineage.middleware_files.push(middleware_file.clone());
                out.middleware.push(MiddlewareSite {
                    relative: relative.clone(),
                    file: middleware_file,
                });
            } else {
                trace!(path = %middleware_file.display(), "Skipping middleware below unroutable directory");
            }
        }

        let route_file = dir.join(self.route_file);
        if route_file.is_file() {
            self.guard.check(&route_file)?;
            if let Some(unroutable) = lineage.unroutable.clone() {
                return Err(unroutable.into_error());
            }
            out.routes.push(RouteSite {
                relative: relative.clone(),
                route_file,
                segments: lineage.segments.clone(),
                middleware_files: lineage.middleware_files.clone(),
            });
        }

        for (name, path) in self.subdirectories(dir)? {
            let canonical = self.guard.check(&path)?;

            if lineage.visited.contains(&canonical) {
                warn!(path = %path.display(), "Skipping symlink cycle");
                continue;
            }

            let mut child = lineage.clone();
            child.visited.push(canonical);
            if child.unroutable.is_none() {
                match lineage.classify(&name) {
                    Ok(segment) => child.segments.push(segment),
                    Err(error) => {
                        trace!(path = %path.display(), %error, "Directory cannot hold routes");
                        child.unroutable = Some(Unroutable { path: path.clone(), error });
                    }
                }
            }
            self.visit(&path, child, out)?;
        }

        Ok(())
    }

    /// Subdirectories of `dir` worth classifying, sorted by name
    fn subdirectories(&self, dir: &Path) -> Result<Vec<(String, PathBuf)>> {
        let entries = fs::read_dir(dir)
            .map_err(|e| RoutingError::discovery(dir, format!("cannot read directory: {e}")))?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| RoutingError::discovery(dir, format!("cannot read entry: {e}")))?;
            let path = entry.path();

            // Follows symlinks; broken links are not directories
            if !fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false) {
                continue;
            }

            let name = entry.file_name().into_string().map_err(|raw| {
                RoutingError::discovery(&path, format!("directory name {raw:?} is not UTF-8"))
            })?;

            if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
                trace!(path = %path.display(), "Skipping directory");
                continue;
            }

            dirs.push((name, path));
        }

        dirs.sort();
        Ok(dirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::route::SegmentKind;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn scan(root: &Path) -> Result<ScanOutcome> {
        let guard = SecurityGuard::new(root)?;
        TreeWalker::new(&guard, "route.toml", "_middleware.toml").scan()
    }

    #[test]
    fn records_sites_in_sorted_order() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "route.toml");
        touch(temp.path(), "users/route.toml");
        touch(temp.path(), "users/[user_id]/route.toml");
        touch(temp.path(), "admin/route.toml");

        let outcome = scan(temp.path()).unwrap();
        let dirs: Vec<_> = outcome.routes.iter().map(|s| s.relative.as_str()).collect();
        assert_eq!(dirs, vec![".", "admin", "users", "users/[user_id]"]);

        let leaf = &outcome.routes[3];
        assert_eq!(leaf.segments[1].kind, SegmentKind::Dynamic("user_id".into()));
    }

    #[test]
    fn middleware_lineage_is_root_first() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "_middleware.toml");
        touch(temp.path(), "(admin)/_middleware.toml");
        touch(temp.path(), "(admin)/settings/route.toml");
        touch(temp.path(), "public/route.toml");

        let outcome = scan(temp.path()).unwrap();
        assert_eq!(outcome.middleware.len(), 2);

        let settings = outcome
            .routes
            .iter()
            .find(|s| s.relative == "(admin)/settings")
            .unwrap();
        assert_eq!(settings.middleware_files.len(), 2);
        assert!(settings.middleware_files[1].ends_with("(admin)/_middleware.toml"));

        let public = outcome.routes.iter().find(|s| s.relative == "public").unwrap();
        assert_eq!(public.middleware_files.len(), 1);
    }

    #[test]
    fn skips_hidden_and_build_directories() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), ".git/route.toml");
        touch(temp.path(), "__pycache__/route.toml");
        touch(temp.path(), "target/route.toml");

        assert!(scan(temp.path()).unwrap().routes.is_empty());
    }

    #[test]
    fn malformed_name_fails_only_with_a_route_below() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "users/route.toml");
        touch(temp.path(), "docs{old}/notes.txt");
        touch(temp.path(), "[bad/_middleware.toml");

        let outcome = scan(temp.path()).unwrap();
        assert_eq!(outcome.routes.len(), 1);
        assert!(outcome.middleware.is_empty());

        touch(temp.path(), "[bad/nested/route.toml");
        match scan(temp.path()).unwrap_err() {
            RoutingError::PathParse { path, source } => {
                assert!(path.ends_with("[bad"));
                assert!(matches!(source, SegmentError::Malformed { .. }));
            }
            other => panic!("expected a path error, got {other:?}"),
        }
    }

    #[test]
    fn subdirectory_under_catch_all_fails() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "files/[...path]/route.toml");
        touch(temp.path(), "files/[...path]/extra/route.toml");

        let err = scan(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            RoutingError::PathParse {
                source: SegmentError::AfterCatchAll { .. },
                ..
            }
        ));
    }

    #[test]
    fn route_less_directory_under_catch_all_is_ignored() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "files/[...path]/route.toml");
        touch(temp.path(), "files/[...path]/assets/logo.svg");

        let outcome = scan(temp.path()).unwrap();
        let dirs: Vec<_> = outcome.routes.iter().map(|s| s.relative.as_str()).collect();
        assert_eq!(dirs, vec!["files/[...path]"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_out_of_root_fails_before_classification() {
        let outside = TempDir::new().unwrap();
        touch(outside.path(), "route.toml");
        let temp = TempDir::new().unwrap();
        // Bracket syntax does not bypass the containment check
        std::os::unix::fs::symlink(outside.path(), temp.path().join("[id]")).unwrap();

        let err = scan(temp.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathTraversal);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycle_is_skipped() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "docs/route.toml");
        std::os::unix::fs::symlink(temp.path().join("docs"), temp.path().join("docs/again"))
            .unwrap();

        let outcome = scan(temp.path()).unwrap();
        assert_eq!(outcome.routes.len(), 1);
    }
}
