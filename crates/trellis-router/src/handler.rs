//! Handlers and handler-level configuration
//!
//! A route file exposes each method slot as a [`RouteHandler`]: either a bare
//! [`Handler`] or a [`RouteConfig`] that wraps one with middleware and
//! metadata overrides.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use futures::future::{self, BoxFuture, FutureExt};

use crate::middleware::MiddlewareBinding;

/// A compiled request entry point: handler or handler wrapped in middleware
pub type Endpoint = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

type BlockingFn = Arc<dyn Fn(Request) -> Response + Send + Sync>;

#[derive(Clone)]
enum HandlerFn {
    Async(Endpoint),
    Blocking(BlockingFn),
}

/// A request handler plus the path parameters it expects
///
/// ```
/// use trellis_router::Handler;
///
/// let show = Handler::new(|_req| async { "user" }).with_params(["user_id"]);
/// assert!(show.is_async());
/// assert_eq!(show.params(), ["user_id".to_string()]);
/// ```
#[derive(Clone)]
pub struct Handler {
    func: HandlerFn,
    params: Vec<String>,
}

impl Handler {
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let endpoint: Endpoint = Arc::new(move |req| {
            let fut = f(req);
            async move { fut.await.into_response() }.boxed()
        });
        Self {
            func: HandlerFn::Async(endpoint),
            params: Vec::new(),
        }
    }

    /// A synchronous handler; it runs inline on the request task
    pub fn blocking<F, R>(f: F) -> Self
    where
        F: Fn(Request) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        Self {
            func: HandlerFn::Blocking(Arc::new(move |req| f(req).into_response())),
            params: Vec::new(),
        }
    }

    /// Declares the path parameter names this handler binds
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn is_async(&self) -> bool {
        matches!(self.func, HandlerFn::Async(_))
    }

    /// This handler as an [`Endpoint`]
    pub fn endpoint(&self) -> Endpoint {
        match &self.func {
            HandlerFn::Async(endpoint) => endpoint.clone(),
            HandlerFn::Blocking(f) => {
                let f = f.clone();
                Arc::new(move |req| future::ready(f(req)).boxed())
            }
        }
    }

    pub async fn call(&self, req: Request) -> Response {
        match &self.func {
            HandlerFn::Async(endpoint) => endpoint(req).await,
            HandlerFn::Blocking(f) => f(req),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("async", &self.is_async())
            .field("params", &self.params)
            .finish()
    }
}

/// Handler-level configuration: a frozen record around one handler
///
/// Every override is optional; absent fields fall back to the route file's
/// constants and then to conventions.
///
/// ```
/// use trellis_router::{Handler, Middleware, RouteConfig};
///
/// let create = RouteConfig::new(Handler::new(|_req| async { "created" }))
///     .with_middleware(Middleware::new(|req, next| next.run(req)))
///     .with_tags(["admin"])
///     .with_status_code(202);
/// assert_eq!(create.status_code(), Some(202));
/// assert_eq!(create.deprecated(), None);
/// ```
#[derive(Clone, Debug)]
pub struct RouteConfig {
    handler: Handler,
    middleware: Option<MiddlewareBinding>,
    tags: Option<Vec<String>>,
    summary: Option<String>,
    deprecated: Option<bool>,
    status_code: Option<u16>,
}

impl RouteConfig {
    pub fn new(handler: Handler) -> Self {
        Self {
            handler,
            middleware: None,
            tags: None,
            summary: None,
            deprecated: None,
            status_code: None,
        }
    }

    /// Replaces any earlier binding
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

    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
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

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Passthrough to the wrapped handler
    pub async fn call(&self, req: Request) -> Response {
        self.handler.call(req).await
    }
}

/// One exported method slot of a route file
#[derive(Clone, Debug)]
pub enum RouteHandler {
    Plain(Handler),
    Configured(RouteConfig),
}

impl RouteHandler {
    pub fn handler(&self) -> &Handler {
        match self {
            Self::Plain(handler) => handler,
            Self::Configured(config) => config.handler(),
        }
    }

    pub fn config(&self) -> Option<&RouteConfig> {
        match self {
            Self::Plain(_) => None,
            Self::Configured(config) => Some(config),
        }
    }
}

impl From<Handler> for RouteHandler {
    fn from(handler: Handler) -> Self {
        Self::Plain(handler)
    }
}

impl From<RouteConfig> for RouteHandler {
    fn from(config: RouteConfig) -> Self {
        Self::Configured(config)
    }
}
