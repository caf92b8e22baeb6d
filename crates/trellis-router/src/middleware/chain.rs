//! Folding ordered middleware around a handler
//!
//! The chain is composed once. Invoking it calls the first middleware with a
//! [`Next`] that reaches the second, and so on down to the handler. A route
//! with no middleware compiles to the handler's own endpoint.

use std::fmt;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;
use futures::future::BoxFuture;

use super::{Middleware, MiddlewareDecl, Next};
use crate::handler::{Endpoint, Handler};

/// A composed, immutable dispatch unit for one route
#[derive(Clone)]
pub struct Chain {
    endpoint: Endpoint,
    names: Arc<[String]>,
}

impl Chain {
    /// Composes `decls` (already in directory, file, handler order) around
    /// `handler`
    pub fn compile<'a, I>(handler: &Handler, decls: I) -> Self
    where
        I: IntoIterator<Item = &'a MiddlewareDecl>,
    {
        let middleware: Vec<Middleware> = decls
            .into_iter()
            .flat_map(|decl| decl.items.iter().cloned())
            .collect();
        Self::from_middleware(handler, middleware)
    }

    pub fn from_middleware(handler: &Handler, middleware: Vec<Middleware>) -> Self {
        let names = middleware.iter().map(|m| m.name().to_string()).collect();
        let endpoint = middleware.into_iter().rev().fold(handler.endpoint(), wrap);
        Self { endpoint, names }
    }

    pub fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        (self.endpoint)(req)
    }

    pub fn endpoint(&self) -> Endpoint {
        Arc::clone(&self.endpoint)
    }

    /// Middleware names, outermost first
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn wrap(next: Endpoint, middleware: Middleware) -> Endpoint {
    Arc::new(move |req| middleware.invoke(req, Next::new(Arc::clone(&next))))
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("middleware", &self.names).finish()
    }
}
