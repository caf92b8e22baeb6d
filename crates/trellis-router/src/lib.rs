//! # Trellis Router
//!
//! File-based route discovery with cascading middleware. A directory tree is
//! compiled once into an immutable [`RouteTable`]:
//! - Static segments (`users/`)
//! - Dynamic parameters (`[user_id]/` → `/:user_id`)
//! - Optional parameters (`[[version]]/`, expanded into both variants)
//! - Catch-all parameters (`[...path]/` → `/*path`)
//! - Groups (`(admin)/`), invisible in URLs but owning middleware
//!
//! ## Middleware
//!
//! Each route's chain is directory middleware from the root down to the
//! route's directory, then the route file's middleware, then the handler's.
//! Chains are folded into nested continuations at discovery time; a route
//! without middleware calls its handler directly.
//!
//! ## Example
//!
//! ```no_run
//! use trellis_router::{discover, DiscoverOptions, Handler, ManifestLoader, Middleware, Registry};
//!
//! let registry = Registry::new()
//!     .with_handler("users.list", Handler::new(|_req| async { "[]" }))
//!     .with_middleware("timing", Middleware::new(|req, next| next.run(req)));
//!
//! let table = discover(
//!     "routes",
//!     &DiscoverOptions::new().with_prefix("/api"),
//!     &ManifestLoader::new(registry),
//! )?;
//! for entry in &table {
//!     println!("{} {}", entry.method, entry.pattern);
//! }
//! # Ok::<(), trellis_router::RoutingError>(())
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod discover;
pub mod duplicates;
pub mod error;
pub mod filter;
pub mod handler;
pub mod manifest;
pub mod metadata;
pub mod middleware;
pub mod path;
pub mod route;
pub mod table;
pub mod walker;

// ============================================================================
// Re-exports
// ============================================================================

pub use axum;

pub use discover::{discover, DiscoverOptions, DEFAULT_MIDDLEWARE_FILE, DEFAULT_ROUTE_FILE};
pub use error::{ErrorKind, Result, RoutingError, SegmentError, SourceLocation};
pub use filter::RouteFilter;
pub use handler::{Endpoint, Handler, RouteConfig, RouteHandler};
pub use manifest::{LoadError, ManifestLoader, MiddlewareModule, ModuleLoader, Registry, RouteModule};
pub use metadata::RouteMetadata;
pub use middleware::{Chain, Dispatch, Middleware, MiddlewareBinding, MiddlewareDecl, Next, Scope};
pub use path::{is_valid_path, normalize_path, SecurityGuard};
pub use route::{classify_segment, PathPattern, RouteMethod, Segment, SegmentKind};
pub use table::{RouteEntry, RouteKey, RouteSnapshot, RouteTable};
