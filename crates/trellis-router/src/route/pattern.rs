//! URL patterns and optional-segment expansion
//!
//! A segment lineage (root to leaf) folds into one or more concrete
//! [`PathPattern`]s. All functions are pure.

use std::fmt;

use super::segment::{Segment, SegmentKind};
use crate::error::SegmentError;

/// Upper bound on optional segments in one lineage (2^16 variants)
pub const MAX_OPTIONAL_SEGMENTS: usize = 16;

/// One URL component of a concrete pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternPart {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// A concrete URL pattern, rendered in axum syntax
///
/// # Examples
///
/// ```
/// use trellis_router::route::{PathPattern, PatternPart};
///
/// let pattern = PathPattern::new(
///     Some("/api".into()),
///     vec![
///         PatternPart::Static("users".into()),
///         PatternPart::Param("user_id".into()),
///     ],
/// );
/// assert_eq!(pattern.to_string(), "/api/users/:user_id");
/// assert_eq!(PathPattern::new(None, vec![]).to_string(), "/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern {
    prefix: Option<String>,
    parts: Vec<PatternPart>,
}

impl PathPattern {
    /// `prefix` must already be normalized (`/api`), or `None`
    pub fn new(prefix: Option<String>, parts: Vec<PatternPart>) -> Self {
        Self { prefix, parts }
    }

    pub fn parts(&self) -> &[PatternPart] {
        &self.parts
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Parameter names in URL order
    pub fn params(&self) -> Vec<String> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                PatternPart::Param(name) | PatternPart::CatchAll(name) => Some(name.clone()),
                PatternPart::Static(_) => None,
            })
            .collect()
    }

    /// Registration priority: fewer params, then fewer parts, then text
    pub fn priority(&self) -> (usize, usize, String) {
        (self.params().len(), self.parts.len(), self.render())
    }

    pub fn render(&self) -> String {
        let mut out = self.prefix.clone().unwrap_or_default();
        for part in &self.parts {
            match part {
                PatternPart::Static(name) => {
                    out.push('/');
                    out.push_str(name);
                }
                PatternPart::Param(name) => {
                    out.push_str("/:");
                    out.push_str(name);
                }
                PatternPart::CatchAll(name) => {
                    out.push_str("/*");
                    out.push_str(name);
                }
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Fold accumulator for one variant
#[derive(Default)]
struct PatternBuilder {
    parts: Vec<PatternPart>,
    optional_index: usize,
}

impl PatternBuilder {
    fn with_static(mut self, name: &str) -> Self {
        self.parts.push(PatternPart::Static(name.to_string()));
        self
    }

    fn with_param(mut self, name: &str) -> Self {
        self.parts.push(PatternPart::Param(name.to_string()));
        self
    }

    fn with_optional(mut self, name: &str, mask: u32) -> Self {
        if mask & (1 << self.optional_index) != 0 {
            self.parts.push(PatternPart::Param(name.to_string()));
        }
        self.optional_index += 1;
        self
    }

    fn with_catch_all(mut self, name: &str) -> Self {
        self.parts.push(PatternPart::CatchAll(name.to_string()));
        self
    }

    fn build(self, prefix: Option<&str>) -> PathPattern {
        PathPattern::new(prefix.map(str::to_string), self.parts)
    }
}

fn process_segment(builder: PatternBuilder, segment: &Segment, mask: u32) -> PatternBuilder {
    match &segment.kind {
        SegmentKind::Static(name) => builder.with_static(name),
        SegmentKind::Dynamic(name) => builder.with_param(name),
        SegmentKind::Optional(name) => builder.with_optional(name, mask),
        SegmentKind::CatchAll(name) => builder.with_catch_all(name),
        SegmentKind::Group(_) => builder,
    }
}

/// Expands a lineage into its concrete patterns
///
/// With `n` optional segments this yields `2^n` patterns ordered by bitmask:
/// bit `i` set means the `i`-th optional segment is present, so the first
/// pattern has every optional segment absent and the last has all present.
/// Group segments contribute nothing.
///
/// Fails with [`SegmentError::TooManyOptional`] when the lineage holds more
/// than [`MAX_OPTIONAL_SEGMENTS`] optional segments.
pub fn expand_variants(
    segments: &[Segment],
    prefix: Option<&str>,
) -> Result<Vec<PathPattern>, SegmentError> {
    let optionals: Vec<&Segment> = segments.iter().filter(|s| s.kind.is_optional()).collect();
    if let Some(extra) = optionals.get(MAX_OPTIONAL_SEGMENTS) {
        return Err(SegmentError::TooManyOptional {
            segment: extra.original.clone(),
            max: MAX_OPTIONAL_SEGMENTS,
        });
    }
    let variants = (0..(1u32 << optionals.len()))
        .map(|mask| {
            segments
                .iter()
                .fold(PatternBuilder::default(), |builder, segment| {
                    process_segment(builder, segment, mask)
                })
                .build(prefix)
        })
        .collect();
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lineage(names: &[&str]) -> Vec<Segment> {
        names.iter().map(|n| Segment::parse(n).unwrap()).collect()
    }

    fn rendered(segments: &[Segment], prefix: Option<&str>) -> Vec<String> {
        expand_variants(segments, prefix)
            .unwrap()
            .iter()
            .map(PathPattern::render)
            .collect()
    }

    #[test]
    fn static_and_dynamic() {
        let segs = lineage(&["users", "[user_id]", "posts"]);
        assert_eq!(rendered(&segs, None), vec!["/users/:user_id/posts"]);
    }

    #[test]
    fn empty_lineage_is_root() {
        assert_eq!(rendered(&[], None), vec!["/"]);
        assert_eq!(rendered(&[], Some("/api")), vec!["/api"]);
    }

    #[test]
    fn groups_are_elided() {
        let segs = lineage(&["(admin)", "settings"]);
        assert_eq!(rendered(&segs, None), vec!["/settings"]);

        let only_group = lineage(&["(marketing)"]);
        assert_eq!(rendered(&only_group, None), vec!["/"]);
    }

    #[test]
    fn catch_all_renders_wildcard() {
        let segs = lineage(&["files", "[...path]"]);
        let patterns = expand_variants(&segs, None).unwrap();
        assert_eq!(patterns[0].render(), "/files/*path");
        assert_eq!(patterns[0].params(), vec!["path".to_string()]);
    }

    #[test]
    fn single_optional_yields_two_variants() {
        let segs = lineage(&["api", "[[version]]", "users"]);
        assert_eq!(
            rendered(&segs, None),
            vec!["/api/users", "/api/:version/users"]
        );
    }

    #[test]
    fn two_optionals_ordered_by_bitmask() {
        let segs = lineage(&["[[a]]", "[[b]]", "items"]);
        assert_eq!(
            rendered(&segs, None),
            vec!["/items", "/:a/items", "/:b/items", "/:a/:b/items"]
        );
    }

    #[test]
    fn prefix_applies_to_every_variant() {
        let segs = lineage(&["[[lang]]", "docs"]);
        assert_eq!(
            rendered(&segs, Some("/v1")),
            vec!["/v1/docs", "/v1/:lang/docs"]
        );
    }

    #[test]
    fn too_many_optionals_is_an_error() {
        let names: Vec<String> = (0..=MAX_OPTIONAL_SEGMENTS).map(|i| format!("[[p{i}]]")).collect();
        let segs: Vec<Segment> = names.iter().map(|n| Segment::parse(n).unwrap()).collect();

        let err = expand_variants(&segs, None).unwrap_err();
        assert_eq!(
            err,
            SegmentError::TooManyOptional {
                segment: format!("[[p{MAX_OPTIONAL_SEGMENTS}]]"),
                max: MAX_OPTIONAL_SEGMENTS,
            }
        );
        assert_eq!(expand_variants(&segs[..3], None).unwrap().len(), 8);
    }

    #[test]
    fn priority_orders_static_first() {
        let static_route = expand_variants(&lineage(&["users", "me"]), None).unwrap().remove(0);
        let dynamic_route = expand_variants(&lineage(&["users", "[id]"]), None).unwrap().remove(0);
        let short = expand_variants(&lineage(&["users"]), None).unwrap().remove(0);
        assert!(short.priority() < static_route.priority());
        assert!(static_route.priority() < dynamic_route.priority());
    }
}
