// Trellis - file-based routing for axum
// Route trees with cascading middleware, compiled once at startup

pub mod config;
pub mod mount;

pub use config::{Config, RoutingConfig, ServerConfig, DEFAULT_CONFIG_FILE};
pub use mount::mount;

// Re-export the routing core
pub use trellis_router as router;
pub use trellis_router::{
    discover, Chain, DiscoverOptions, Dispatch, ErrorKind, Handler, ManifestLoader, Middleware,
    MiddlewareBinding, ModuleLoader, Next, Registry, RouteConfig, RouteEntry, RouteMetadata,
    RouteMethod, RouteSnapshot, RouteTable, RoutingError,
};

// Re-export commonly used types from dependencies
pub use axum;
pub use axum::http::StatusCode;
