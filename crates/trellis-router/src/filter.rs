//! Include/exclude selection of route directories
//!
//! Patterns match a route directory's root-relative posix path (`.` for the
//! root). A pattern with a glob metacharacter (`*`, `?`, `[`) matches the
//! whole path; a bare name matches any single segment of it.

use std::collections::BTreeSet;

use glob::Pattern;

use crate::error::{Result, RoutingError};
use crate::path::PathHierarchy;

const GLOB_CHARS: [char; 3] = ['*', '?', '['];

#[derive(Debug, Clone)]
enum Matcher {
    Glob(Pattern),
    Segment(String),
}

impl Matcher {
    fn parse(raw: &str) -> Result<Self> {
        if raw.contains(GLOB_CHARS) {
            Pattern::new(raw)
                .map(Self::Glob)
                .map_err(|e| RoutingError::RouteFilter(format!("invalid glob `{raw}`: {e}")))
        } else {
            Ok(Self::Segment(raw.to_string()))
        }
    }

    fn matches(&self, relative: &str) -> bool {
        match self {
            Self::Glob(pattern) => pattern.matches(relative),
            Self::Segment(name) => {
                relative != "." && relative.split('/').any(|segment| segment == name)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Mode {
    All,
    Include(Vec<Matcher>),
    Exclude(Vec<Matcher>),
}

/// Decides which route directories take part in discovery
///
/// ```
/// use trellis_router::RouteFilter;
///
/// let filter = RouteFilter::new(&["users".into()], &[]).unwrap();
/// assert!(filter.allows("api/users/[user_id]"));
/// assert!(!filter.allows("api/orders"));
///
/// let filter = RouteFilter::new(&[], &["admin/*".into()]).unwrap();
/// assert!(!filter.allows("admin/settings"));
/// assert!(filter.allows("api"));
///
/// assert!(RouteFilter::new(&["a".into()], &["b".into()]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RouteFilter {
    mode: Mode,
}

impl RouteFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let parse_all = |raw: &[String]| {
            raw.iter()
                .map(|p| Matcher::parse(p))
                .collect::<Result<Vec<_>>>()
        };

        let mode = match (include.is_empty(), exclude.is_empty()) {
            (true, true) => Mode::All,
            (false, true) => Mode::Include(parse_all(include)?),
            (true, false) => Mode::Exclude(parse_all(exclude)?),
            (false, false) => {
                return Err(RoutingError::RouteFilter(
                    "include and exclude cannot both be set".to_string(),
                ))
            }
        };
        Ok(Self { mode })
    }

    /// Whether any filtering takes place
    pub fn is_active(&self) -> bool {
        !matches!(self.mode, Mode::All)
    }

    pub fn allows(&self, relative: &str) -> bool {
        match &self.mode {
            Mode::All => true,
            Mode::Include(matchers) => matchers.iter().any(|m| m.matches(relative)),
            Mode::Exclude(matchers) => !matchers.iter().any(|m| m.matches(relative)),
        }
    }

    /// Directories whose middleware applies to at least one of `routes`
    pub fn active_directories<'a, I>(routes: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        routes
            .into_iter()
            .flat_map(PathHierarchy::new)
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(&["users"], "users", true)]
    #[case(&["users"], "api/users/[user_id]", true)]
    #[case(&["users"], "api/user", false)]
    #[case(&["users"], ".", false)]
    #[case(&["api/*"], "api/users", true)]
    #[case(&["api/*"], "api", false)]
    #[case(&["*"], ".", true)]
    #[case(&["v?"], "v1", true)]
    #[case(&["orders", "users"], "orders", true)]
    fn include(#[case] patterns: &[&str], #[case] relative: &str, #[case] expected: bool) {
        let filter = RouteFilter::new(&strings(patterns), &[]).unwrap();
        assert_eq!(filter.allows(relative), expected);
    }

    #[test]
    fn exclude_inverts() {
        let filter = RouteFilter::new(&[], &strings(&["(admin)"])).unwrap();
        assert!(!filter.allows("(admin)/settings"));
        assert!(filter.allows("users"));
        assert!(filter.allows("."));
    }

    #[test]
    fn no_patterns_allows_everything() {
        let filter = RouteFilter::new(&[], &[]).unwrap();
        assert!(!filter.is_active());
        assert!(filter.allows("anything/at/all"));
    }

    #[test]
    fn rejects_both_lists() {
        let err = RouteFilter::new(&strings(&["a"]), &strings(&["b"])).unwrap_err();
        assert!(matches!(err, RoutingError::RouteFilter(_)));
    }

    #[test]
    fn rejects_malformed_glob() {
        let err = RouteFilter::new(&strings(&["api/[users"]), &[]).unwrap_err();
        assert!(matches!(err, RoutingError::RouteFilter(_)));
    }

    #[test]
    fn active_directories_are_ancestors() {
        let active = RouteFilter::active_directories(["api/users", "(admin)/settings"]);
        let expected: BTreeSet<String> =
            strings(&[".", "api", "api/users", "(admin)", "(admin)/settings"])
                .into_iter()
                .collect();
        assert_eq!(active, expected);
    }
}
