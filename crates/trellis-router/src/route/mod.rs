//! Route module: directory names to URL patterns
//!
//! - `segment`: classifies one directory name
//! - `pattern`: folds a lineage into concrete patterns, expanding optionals
//! - `method`: handler slots and their conventions

pub mod method;
pub mod pattern;
pub mod segment;

pub use method::RouteMethod;
pub use pattern::{expand_variants, PathPattern, PatternPart, MAX_OPTIONAL_SEGMENTS};
pub use segment::{classify_segment, is_identifier, Segment, SegmentKind};
