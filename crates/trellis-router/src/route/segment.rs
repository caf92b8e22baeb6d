//! Directory-name classification
//!
//! Pure functions: a directory name maps to exactly one [`SegmentKind`] or a
//! [`SegmentError`]. No filesystem access happens here.

use crate::error::SegmentError;

/// Characters the host router treats as placeholder syntax
const RESERVED: [char; 4] = [':', '*', '{', '}'];

/// The kind of one directory name
///
/// # Examples
///
/// ```
/// use trellis_router::route::{classify_segment, SegmentKind};
///
/// assert_eq!(classify_segment("about").unwrap(), SegmentKind::Static("about".into()));
/// assert_eq!(classify_segment("[id]").unwrap(), SegmentKind::Dynamic("id".into()));
/// assert_eq!(classify_segment("[[page]]").unwrap(), SegmentKind::Optional("page".into()));
/// assert_eq!(classify_segment("[...path]").unwrap(), SegmentKind::CatchAll("path".into()));
/// assert_eq!(classify_segment("(admin)").unwrap(), SegmentKind::Group("admin".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Literal URL text
    Static(String),
    /// `[name]`
    Dynamic(String),
    /// `[[name]]`, present or absent
    Optional(String),
    /// `[...name]`, the rest of the path
    CatchAll(String),
    /// `(name)`, no URL text
    Group(String),
}

impl SegmentKind {
    /// Parameter name for parameter kinds
    pub fn param(&self) -> Option<&str> {
        match self {
            Self::Dynamic(name) | Self::Optional(name) | Self::CatchAll(name) => Some(name),
            Self::Static(_) | Self::Group(_) => None,
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, Self::CatchAll(_))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

/// A classified directory name, keeping the original for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub kind: SegmentKind,
    pub original: String,
}

impl Segment {
    pub fn parse(name: &str) -> Result<Self, SegmentError> {
        Ok(Self {
            kind: classify_segment(name)?,
            original: name.to_string(),
        })
    }
}

/// Classifies one directory name (pure function)
///
/// # Parsing Rules (evaluated in order)
///
/// 1. **Optional**: `[[name]]`
/// 2. **Catch-all**: `[...name]`
/// 3. **Dynamic**: `[name]`
/// 4. **Group**: `(name)`
/// 5. **Static**: anything without brackets, parentheses or reserved characters
pub fn classify_segment(segment: &str) -> Result<SegmentKind, SegmentError> {
    if segment.is_empty() {
        return Err(SegmentError::Empty);
    }

    if let Some(inner) = segment
        .strip_prefix("[[")
        .and_then(|s| s.strip_suffix("]]"))
    {
        return param_name(segment, inner).map(SegmentKind::Optional);
    }

    if let Some(inner) = segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return match inner.strip_prefix("...") {
            Some(rest) => param_name(segment, rest).map(SegmentKind::CatchAll),
            None => param_name(segment, inner).map(SegmentKind::Dynamic),
        };
    }

    if let Some(inner) = segment.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        if inner.is_empty() {
            return Err(SegmentError::EmptyGroup {
                segment: segment.to_string(),
            });
        }
        if inner.contains(is_bracket) {
            return Err(malformed(segment));
        }
        return Ok(SegmentKind::Group(inner.to_string()));
    }

    if segment.contains(is_bracket) {
        return Err(malformed(segment));
    }

    match segment.chars().find(|c| RESERVED.contains(c)) {
        Some(ch) => Err(SegmentError::ReservedCharacter {
            segment: segment.to_string(),
            ch,
        }),
        None => Ok(SegmentKind::Static(segment.to_string())),
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn param_name(segment: &str, name: &str) -> Result<String, SegmentError> {
    if name.is_empty() {
        return Err(SegmentError::EmptyParam {
            segment: segment.to_string(),
        });
    }
    if name.contains(is_bracket) || name.starts_with("...") {
        return Err(malformed(segment));
    }
    if !is_identifier(name) {
        return Err(SegmentError::InvalidIdentifier {
            segment: segment.to_string(),
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

fn is_bracket(c: char) -> bool {
    matches!(c, '[' | ']' | '(' | ')')
}

fn malformed(segment: &str) -> SegmentError {
    SegmentError::Malformed {
        segment: segment.to_string(),
    }
}
