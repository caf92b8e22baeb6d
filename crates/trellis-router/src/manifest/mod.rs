//! The module-loading boundary
//!
//! Discovery never interprets files itself. It asks a [`ModuleLoader`] for
//! the declarations a route file or middleware file makes, as a
//! [`RouteModule`] or [`MiddlewareModule`].

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::handler::RouteHandler;
use crate::middleware::MiddlewareBinding;

pub mod loader;
pub mod registry;

pub use loader::ManifestLoader;
pub use registry::Registry;

/// Why a file could not be turned into a module
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read file: {0}")]
    Io(#[from] io::Error),

    #[error("cannot parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Loads declarations from route and middleware files
pub trait ModuleLoader {
    fn load_route(&self, file: &Path) -> Result<RouteModule, LoadError>;

    fn load_middleware(&self, file: &Path) -> Result<MiddlewareModule, LoadError>;
}

/// Everything a route file declares
///
/// Exports keep their declared names; discovery decides which are method
/// slots, which are private helpers (`_` prefix) and which are invalid.
///
/// ```
/// use trellis_router::{Handler, RouteModule};
///
/// let module = RouteModule::new()
///     .with_export("get", Handler::new(|_req| async { "list" }))
///     .with_tags(["users"]);
/// assert_eq!(module.exports().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RouteModule {
    exports: Vec<(String, RouteHandler)>,
    middleware: Option<MiddlewareBinding>,
    tags: Option<Vec<String>>,
    summary: Option<String>,
    deprecated: Option<bool>,
}

impl RouteModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_export(mut self, name: impl Into<String>, handler: impl Into<RouteHandler>) -> Self {
        self.exports.push((name.into(), handler.into()));
        self
    }

    /// File-level middleware; binding again replaces the earlier binding
    pub fn with_middleware(mut self, binding: impl Into<MiddlewareBinding>) -> Self {
        self.middleware = Some(binding.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    pub fn exports(&self) -> &[(String, RouteHandler)] {
        &self.exports
    }

    pub fn middleware(&self) -> Option<&MiddlewareBinding> {
        self.middleware.as_ref()
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn deprecated(&self) -> Option<bool> {
        self.deprecated
    }
}

/// What a directory middleware file declares
#[derive(Clone, Debug, Default)]
pub struct MiddlewareModule {
    middleware: Option<MiddlewareBinding>,
}

impl MiddlewareModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binding again replaces the earlier binding
    pub fn with_middleware(mut self, binding: impl Into<MiddlewareBinding>) -> Self {
        self.middleware = Some(binding.into());
        self
    }

    pub fn middleware(&self) -> Option<&MiddlewareBinding> {
        self.middleware.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Middleware;

    fn named(name: &str) -> Middleware {
        Middleware::new(|req, next: crate::middleware::Next| next.run(req)).named(name)
    }

    #[test]
    fn last_middleware_binding_wins() {
        let module = MiddlewareModule::new()
            .with_middleware(vec![named("a"), named("b")])
            .with_middleware(named("inline"));

        match module.middleware() {
            Some(MiddlewareBinding::Single(mw)) => assert_eq!(mw.name(), "inline"),
            other => panic!("expected the single binding, got {other:?}"),
        }

        let module = RouteModule::new()
            .with_middleware(named("inline"))
            .with_middleware(vec![named("a"), named("b")]);
        assert_eq!(module.middleware().map(MiddlewareBinding::len), Some(2));
    }
}
