//! The compiled, immutable route table

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::SourceLocation;
use crate::metadata::RouteMetadata;
use crate::middleware::Chain;
use crate::route::{PathPattern, RouteMethod};

/// Identity of a route: rendered pattern plus method
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    pub pattern: String,
    pub method: RouteMethod,
}

impl RouteKey {
    pub fn new(pattern: impl Into<String>, method: RouteMethod) -> Self {
        Self {
            pattern: pattern.into(),
            method,
        }
    }
}

/// One (pattern, method) pair before deduplication
#[derive(Debug, Clone)]
pub struct RouteCandidate {
    pub pattern: PathPattern,
    pub method: RouteMethod,
    pub source: SourceLocation,
    /// Index of the owning route site
    pub site: usize,
    /// Index of the export within the site's module
    pub export: usize,
}

impl RouteCandidate {
    pub fn key(&self) -> RouteKey {
        RouteKey::new(self.pattern.render(), self.method)
    }
}

/// A registered route: pattern, method, compiled chain and metadata
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub pattern: PathPattern,
    pub method: RouteMethod,
    pub chain: Chain,
    pub metadata: RouteMetadata,
    pub source: SourceLocation,
    /// Parameter names in URL order
    pub params: Vec<String>,
}

impl RouteEntry {
    pub fn key(&self) -> RouteKey {
        RouteKey::new(self.pattern.render(), self.method)
    }

    pub fn snapshot(&self) -> RouteSnapshot {
        RouteSnapshot {
            method: self.method,
            pattern: self.pattern.render(),
            params: self.params.clone(),
            middleware: self.chain.names().to_vec(),
            metadata: self.metadata.clone(),
            source: self.source.file.display().to_string(),
            export: self.source.export.clone(),
        }
    }
}

/// Plain-data view of a [`RouteEntry`], for listings and comparisons
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSnapshot {
    pub method: RouteMethod,
    pub pattern: String,
    pub params: Vec<String>,
    pub middleware: Vec<String>,
    #[serde(flatten)]
    pub metadata: RouteMetadata,
    pub source: String,
    pub export: String,
}

/// Routes in registration priority order, indexed by [`RouteKey`]
///
/// Cheap to clone; clones share the same entries.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Arc<[RouteEntry]>,
    index: Arc<HashMap<RouteKey, usize>>,
}

impl RouteTable {
    /// Orders by priority: fewer params, then fewer parts, then pattern, then method
    pub(crate) fn new(mut entries: Vec<RouteEntry>) -> Self {
        entries.sort_by_cached_key(|entry| (entry.pattern.priority(), entry.method));

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.key(), i))
            .collect();

        Self {
            entries: entries.into(),
            index: Arc::new(index),
        }
    }

    pub fn get(&self, pattern: &str, method: RouteMethod) -> Option<&RouteEntry> {
        self.index
            .get(&RouteKey::new(pattern, method))
            .map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> Vec<RouteSnapshot> {
        self.entries.iter().map(RouteEntry::snapshot).collect()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteEntry;
    type IntoIter = std::slice::Iter<'a, RouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
