//! Per-route documentation metadata
//!
//! Precedence per field: handler override, then route file constant, then
//! convention.

use serde::Serialize;

use crate::handler::RouteHandler;
use crate::manifest::RouteModule;
use crate::route::{RouteMethod, Segment, SegmentKind};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RouteMetadata {
    /// Ordered, without duplicates
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub deprecated: bool,
    /// `None` for websocket routes
    pub status_code: Option<u16>,
}

/// First static segment whose name is not in `skip`
///
/// ```
/// use trellis_router::metadata::derive_tags;
/// use trellis_router::route::Segment;
///
/// let lineage: Vec<Segment> = ["(admin)", "api", "[[version]]", "users"]
///     .iter()
///     .map(|n| Segment::parse(n).unwrap())
///     .collect();
///
/// assert_eq!(derive_tags(&lineage, &[]), vec!["api"]);
/// assert_eq!(derive_tags(&lineage, &["api".to_string()]), vec!["users"]);
/// ```
pub fn derive_tags(segments: &[Segment], skip: &[String]) -> Vec<String> {
    segments
        .iter()
        .find_map(|segment| match &segment.kind {
            SegmentKind::Static(name) if !skip.contains(name) => Some(name.clone()),
            _ => None,
        })
        .into_iter()
        .collect()
}

/// Resolves the final metadata of one handler
pub fn resolve_metadata(
    method: RouteMethod,
    handler: &RouteHandler,
    module: &RouteModule,
    segments: &[Segment],
    tag_skip_segments: &[String],
) -> RouteMetadata {
    let config = handler.config();

    let tags = match config.and_then(|c| c.tags()) {
        Some(tags) => tags.to_vec(),
        None => match module.tags() {
            Some(tags) if !tags.is_empty() => tags.to_vec(),
            _ => derive_tags(segments, tag_skip_segments),
        },
    };

    let summary = config
        .and_then(|c| c.summary())
        .or_else(|| module.summary())
        .map(str::to_string);

    let deprecated = config
        .and_then(|c| c.deprecated())
        .or_else(|| module.deprecated())
        .unwrap_or(false);

    let status_code = config
        .and_then(|c| c.status_code())
        .or_else(|| method.default_status());

    RouteMetadata {
        tags: dedup(tags),
        summary,
        deprecated,
        status_code,
    }
}

fn dedup(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}
