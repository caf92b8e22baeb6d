//! Middleware values, continuations and scoped declarations
//!
//! A middleware is a two-argument callable `(Request, Next) -> Response`.
//! It may call [`Next::run`] to continue the chain, or return early to
//! short-circuit it.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;
use futures::future::{self, BoxFuture, FutureExt};

use crate::handler::Endpoint;

pub mod chain;
pub mod validate;

pub use chain::Chain;
pub use validate::validate_binding;

type AsyncFn = Arc<dyn Fn(Request, Next) -> BoxFuture<'static, Response> + Send + Sync>;
type BlockingFn = Arc<dyn Fn(Request, Next) -> Response + Send + Sync>;

#[derive(Clone)]
enum MiddlewareFn {
    Async(AsyncFn),
    Blocking(BlockingFn),
}

/// The remainder of a chain, handed to each middleware
pub struct Next {
    inner: Endpoint,
}

impl Next {
    pub(crate) fn new(inner: Endpoint) -> Self {
        Self { inner }
    }

    /// Invokes the next middleware, or the handler at the end of the chain
    pub async fn run(self, req: Request) -> Response {
        (self.inner)(req).await
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// Struct-based middleware
///
/// ```
/// use trellis_router::{Dispatch, Middleware, Next};
/// use trellis_router::axum::{extract::Request, response::Response};
/// use futures::future::BoxFuture;
///
/// struct Tagging {
///     header: &'static str,
/// }
///
/// impl Dispatch for Tagging {
///     fn dispatch<'a>(&'a self, req: Request, next: Next) -> BoxFuture<'a, Response> {
///         Box::pin(async move {
///             let mut response = next.run(req).await;
///             response.headers_mut().insert(self.header, "1".parse().unwrap());
///             response
///         })
///     }
/// }
///
/// let mw = Middleware::from_dispatch(Tagging { header: "x-tagged" });
/// assert!(mw.is_async());
/// ```
pub trait Dispatch: Send + Sync + 'static {
    fn dispatch<'a>(&'a self, req: Request, next: Next) -> BoxFuture<'a, Response>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A named middleware callable
#[derive(Clone)]
pub struct Middleware {
    name: Arc<str>,
    func: MiddlewareFn,
}

impl Middleware {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            name: std::any::type_name::<F>().into(),
            func: MiddlewareFn::Async(Arc::new(move |req, next| f(req, next).boxed())),
        }
    }

    /// A synchronous middleware; validation always rejects it
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(Request, Next) -> Response + Send + Sync + 'static,
    {
        Self {
            name: std::any::type_name::<F>().into(),
            func: MiddlewareFn::Blocking(Arc::new(f)),
        }
    }

    pub fn from_dispatch<D: Dispatch>(dispatch: D) -> Self {
        let name: Arc<str> = dispatch.name().into();
        let dispatch = Arc::new(dispatch);
        Self {
            name,
            func: MiddlewareFn::Async(Arc::new(move |req, next| {
                let dispatch = Arc::clone(&dispatch);
                async move { dispatch.dispatch(req, next).await }.boxed()
            })),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into().into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_async(&self) -> bool {
        matches!(self.func, MiddlewareFn::Async(_))
    }

    pub(crate) fn invoke(&self, req: Request, next: Next) -> BoxFuture<'static, Response> {
        match &self.func {
            MiddlewareFn::Async(f) => f(req, next),
            MiddlewareFn::Blocking(f) => future::ready(f(req, next)).boxed(),
        }
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name)
            .field("async", &self.is_async())
            .finish()
    }
}

/// A middleware declaration: a list, or a single inline middleware
#[derive(Clone, Debug)]
pub enum MiddlewareBinding {
    List(Vec<Middleware>),
    Single(Middleware),
}

impl MiddlewareBinding {
    pub fn items(&self) -> &[Middleware] {
        match self {
            Self::List(items) => items,
            Self::Single(item) => std::slice::from_ref(item),
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl From<Middleware> for MiddlewareBinding {
    fn from(middleware: Middleware) -> Self {
        Self::Single(middleware)
    }
}

impl From<Vec<Middleware>> for MiddlewareBinding {
    fn from(middleware: Vec<Middleware>) -> Self {
        Self::List(middleware)
    }
}

/// Where a declaration applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A directory and its whole subtree
    Directory,
    /// Handlers defined directly in one route file
    File,
    /// One handler
    Handler,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Directory => "directory",
            Self::File => "file",
            Self::Handler => "handler",
        })
    }
}

/// Validated middleware for one scope, in declared order
#[derive(Clone, Debug)]
pub struct MiddlewareDecl {
    pub scope: Scope,
    pub items: Vec<Middleware>,
    pub source: PathBuf,
}
