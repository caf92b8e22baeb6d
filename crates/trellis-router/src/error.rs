//! Error types for route discovery
//!
//! Every failure is raised during the single discovery pass and is fatal to
//! that pass; no partial table is ever returned.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::route::RouteMethod;

pub type Result<T> = std::result::Result<T, RoutingError>;

/// Coarse classification of a [`RoutingError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Discovery,
    PathParse,
    PathTraversal,
    RouteValidation,
    DuplicateRoute,
    ParamConflict,
    MiddlewareValidation,
    RouteFilter,
}

/// Where a handler was declared: the route file plus the export name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub export: String,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, export: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            export: export.into(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (`{}`)", self.file.display(), self.export)
    }
}

#[derive(Error, Debug)]
pub enum RoutingError {
    /// The root is missing, not a directory, or could not be read
    #[error("route discovery failed for {}: {reason}", .path.display())]
    Discovery { path: PathBuf, reason: String },

    #[error("invalid directory name at {}: {source}", .path.display())]
    PathParse {
        path: PathBuf,
        #[source]
        source: SegmentError,
    },

    /// Lexical `..` or a symlink resolving outside the root
    #[error("path escapes the route root: {} (root: {})", .path.display(), .root.display())]
    PathTraversal { path: PathBuf, root: PathBuf },

    #[error("invalid route file {}: {message}", .file.display())]
    RouteValidation { file: PathBuf, message: String },

    #[error("duplicate route {method} {pattern}\n  first: {first}\n  second: {second}")]
    DuplicateRoute {
        method: RouteMethod,
        pattern: String,
        first: SourceLocation,
        second: SourceLocation,
    },

    /// Two patterns put differently named wildcards after the same path
    #[error(
        "conflicting parameters after {position}: `{first_param}` and `{second_param}`\n  first: {first}\n  second: {second}"
    )]
    ParamConflict {
        position: String,
        first_param: String,
        second_param: String,
        first: SourceLocation,
        second: SourceLocation,
    },

    #[error("invalid middleware in {}: {message}", .file.display())]
    MiddlewareValidation { file: PathBuf, message: String },

    #[error("invalid route filter: {0}")]
    RouteFilter(String),
}

impl RoutingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Discovery { .. } => ErrorKind::Discovery,
            Self::PathParse { .. } => ErrorKind::PathParse,
            Self::PathTraversal { .. } => ErrorKind::PathTraversal,
            Self::RouteValidation { .. } => ErrorKind::RouteValidation,
            Self::DuplicateRoute { .. } => ErrorKind::DuplicateRoute,
            Self::ParamConflict { .. } => ErrorKind::ParamConflict,
            Self::MiddlewareValidation { .. } => ErrorKind::MiddlewareValidation,
            Self::RouteFilter(_) => ErrorKind::RouteFilter,
        }
    }

    pub(crate) fn discovery(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::Discovery {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn route(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::RouteValidation {
            file: file.into(),
            message: message.into(),
        }
    }

    pub(crate) fn middleware(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MiddlewareValidation {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// Why a single directory name could not be classified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("empty directory name")]
    Empty,

    #[error("`{segment}`: parameter name must not be empty")]
    EmptyParam { segment: String },

    #[error(
        "`{segment}`: `{name}` is not a valid identifier \
         (letters, digits and underscores, not starting with a digit)"
    )]
    InvalidIdentifier { segment: String, name: String },

    #[error("`{segment}`: group name must not be empty")]
    EmptyGroup { segment: String },

    #[error("`{segment}`: malformed brackets; use [param], [[param]], [...param] or (group)")]
    Malformed { segment: String },

    #[error("`{segment}`: `{ch}` is reserved and cannot appear in a static segment")]
    ReservedCharacter { segment: String, ch: char },

    #[error("`{segment}` follows catch-all `{catch_all}`; a catch-all must be the last segment")]
    AfterCatchAll { segment: String, catch_all: String },

    #[error("`{segment}`: at most {max} optional segments are supported in one branch")]
    TooManyOptional { segment: String, max: usize },
}
