use std::collections::HashMap;

use crate::handler::Handler;
use crate::middleware::Middleware;

/// Named handlers and middleware that manifests refer to
///
/// ```
/// use trellis_router::{Handler, Middleware, Registry};
///
/// let registry = Registry::new()
///     .with_handler("health.check", Handler::new(|_req| async { "ok" }))
///     .with_middleware("timing", Middleware::new(|req, next| next.run(req)));
///
/// assert!(registry.handler("health.check").is_some());
/// assert_eq!(registry.middleware("timing").map(|m| m.name()), Some("timing"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Registry {
    handlers: HashMap<String, Handler>,
    middleware: HashMap<String, Middleware>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.insert_handler(name, handler);
        self
    }

    /// Registers `middleware` under `name`, which also becomes its display name
    pub fn with_middleware(mut self, name: impl Into<String>, middleware: Middleware) -> Self {
        self.insert_middleware(name, middleware);
        self
    }

    pub fn insert_handler(&mut self, name: impl Into<String>, handler: Handler) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn insert_middleware(&mut self, name: impl Into<String>, middleware: Middleware) {
        let name = name.into();
        let middleware = middleware.named(name.clone());
        self.middleware.insert(name, middleware);
    }

    pub fn handler(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    pub fn middleware(&self, name: &str) -> Option<&Middleware> {
        self.middleware.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.middleware.is_empty()
    }
}
