use std::collections::HashMap;

use crate::error::{Result, RoutingError};
use crate::route::{PathPattern, PatternPart};
use crate::table::{RouteCandidate, RouteKey};

/// Rejects any two candidates sharing a final pattern and method
///
/// Runs over the fully expanded list; nothing is dropped or overwritten.
pub fn check_duplicates(candidates: &[RouteCandidate]) -> Result<()> {
    let mut seen: HashMap<RouteKey, usize> = HashMap::with_capacity(candidates.len());

    for (index, candidate) in candidates.iter().enumerate() {
        let key = candidate.key();
        if let Some(&first) = seen.get(&key) {
            return Err(RoutingError::DuplicateRoute {
                method: key.method,
                pattern: key.pattern,
                first: candidates[first].source.clone(),
                second: candidate.source.clone(),
            });
        }
        seen.insert(key, index);
    }

    Ok(())
}

/// Rejects patterns the host router cannot hold side by side
///
/// After any given path, every pattern must use the same wildcard
/// (`:id` or `*rest`). `/users/:id` next to `/users/:slug` fails; static
/// siblings like `/users/me` are fine.
pub fn check_param_conflicts(candidates: &[RouteCandidate]) -> Result<()> {
    let mut wildcards: HashMap<String, (String, usize)> = HashMap::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let parts = candidate.pattern.parts();
        for (position, part) in parts.iter().enumerate() {
            let wildcard = match part {
                PatternPart::Static(_) => continue,
                PatternPart::Param(name) => format!(":{name}"),
                PatternPart::CatchAll(name) => format!("*{name}"),
            };
            let parent = PathPattern::new(
                candidate.pattern.prefix().map(str::to_string),
                parts[..position].to_vec(),
            )
            .render();

            let (existing, first) = wildcards
                .entry(parent.clone())
                .or_insert_with(|| (wildcard.clone(), index));
            if *existing != wildcard {
                return Err(RoutingError::ParamConflict {
                    position: parent,
                    first_param: existing.clone(),
                    second_param: wildcard,
                    first: candidates[*first].source.clone(),
                    second: candidate.source.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, SourceLocation};
    use crate::route::RouteMethod;

    fn candidate(pattern: &str, method: RouteMethod, file: &str) -> RouteCandidate {
        RouteCandidate {
            pattern: PathPattern::new(None, vec![PatternPart::Static(pattern.into())]),
            method,
            source: SourceLocation::new(file, method.export_name()),
            site: 0,
            export: 0,
        }
    }

    #[test]
    fn distinct_methods_share_a_pattern() {
        let candidates = vec![
            candidate("users", RouteMethod::Get, "a/route.toml"),
            candidate("users", RouteMethod::Post, "a/route.toml"),
            candidate("users", RouteMethod::WebSocket, "a/route.toml"),
        ];
        assert!(check_duplicates(&candidates).is_ok());
    }

    #[test]
    fn collision_names_both_sources() {
        let candidates = vec![
            candidate("settings", RouteMethod::Get, "(admin)/settings/route.toml"),
            candidate("settings", RouteMethod::Get, "settings/route.toml"),
        ];

        let err = check_duplicates(&candidates).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("GET /settings"), "{message}");
        assert!(message.contains("(admin)/settings/route.toml"));
        assert!(message.contains("\n  second: settings/route.toml"));
    }

    fn patterned(parts: Vec<PatternPart>, file: &str) -> RouteCandidate {
        RouteCandidate {
            pattern: PathPattern::new(Some("/api".into()), parts),
            method: RouteMethod::Get,
            source: SourceLocation::new(file, "get"),
            site: 0,
            export: 0,
        }
    }

    fn users(next: PatternPart) -> Vec<PatternPart> {
        vec![PatternPart::Static("users".into()), next]
    }

    #[test]
    fn sibling_params_with_different_names_conflict() {
        let candidates = vec![
            patterned(users(PatternPart::Param("id".into())), "users/[id]/route.toml"),
            patterned(users(PatternPart::Param("slug".into())), "users/[slug]/route.toml"),
        ];

        let err = check_param_conflicts(&candidates).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParamConflict);
        let message = err.to_string();
        assert!(message.contains("after /api/users: `:id` and `:slug`"), "{message}");
        assert!(message.contains("first: users/[id]/route.toml"));
        assert!(message.contains("second: users/[slug]/route.toml"));
    }

    #[test]
    fn param_and_catch_all_at_one_position_conflict() {
        let candidates = vec![
            patterned(users(PatternPart::Param("id".into())), "a/route.toml"),
            patterned(users(PatternPart::CatchAll("rest".into())), "b/route.toml"),
        ];
        assert!(check_param_conflicts(&candidates).is_err());
    }

    #[test]
    fn shared_params_and_static_siblings_are_fine() {
        let mut nested = users(PatternPart::Param("id".into()));
        nested.push(PatternPart::Static("posts".into()));
        let candidates = vec![
            patterned(users(PatternPart::Static("me".into())), "me/route.toml"),
            patterned(users(PatternPart::Param("id".into())), "id/route.toml"),
            patterned(nested, "posts/route.toml"),
        ];
        assert!(check_param_conflicts(&candidates).is_ok());
    }
}
