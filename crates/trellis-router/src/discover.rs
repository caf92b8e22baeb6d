//! The discovery entry point
//!
//! One synchronous pass: scan the tree, select route directories, load and
//! validate every declaration, expand patterns, reject duplicates, then
//! compile each route's chain. Any failure aborts the whole pass.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::duplicates::{check_duplicates, check_param_conflicts};
use crate::error::{Result, RoutingError, SourceLocation};
use crate::filter::RouteFilter;
use crate::handler::RouteHandler;
use crate::manifest::ModuleLoader;
use crate::metadata::{resolve_metadata, RouteMetadata};
use crate::middleware::{validate_binding, Chain, MiddlewareDecl, Scope};
use crate::path::{normalize_prefix, SecurityGuard};
use crate::route::{expand_variants, is_identifier, RouteMethod};
use crate::table::{RouteCandidate, RouteEntry, RouteTable};
use crate::walker::{MiddlewareSite, RouteSite, ScanOutcome, TreeWalker};

pub const DEFAULT_ROUTE_FILE: &str = "route.toml";
pub const DEFAULT_MIDDLEWARE_FILE: &str = "_middleware.toml";

/// Options for one discovery pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverOptions {
    /// URL prefix for every route; empty or `/` for none
    pub prefix: String,
    /// Keep only matching route directories
    pub include: Vec<String>,
    /// Drop matching route directories
    pub exclude: Vec<String>,
    pub route_file: String,
    pub middleware_file: String,
    /// Static names skipped when deriving tags (`api`, `v1`)
    pub tag_skip_segments: Vec<String>,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            route_file: DEFAULT_ROUTE_FILE.to_string(),
            middleware_file: DEFAULT_MIDDLEWARE_FILE.to_string(),
            tag_skip_segments: Vec::new(),
        }
    }
}

impl DiscoverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_route_file(mut self, name: impl Into<String>) -> Self {
        self.route_file = name.into();
        self
    }

    pub fn with_middleware_file(mut self, name: impl Into<String>) -> Self {
        self.middleware_file = name.into();
        self
    }

    pub fn with_tag_skip_segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_skip_segments = segments.into_iter().map(Into::into).collect();
        self
    }
}

/// A validated handler, ready to be registered under each of its patterns
struct LoadedHandler {
    method: RouteMethod,
    source: SourceLocation,
    chain: Chain,
    metadata: RouteMetadata,
}

/// Builds a route table from the tree at `base`
///
/// # Errors
///
/// - `Discovery`: `base` is missing or not a directory
/// - `PathParse`: a directory above a route file is malformed, or a route file sits below a catch-all
/// - `PathTraversal`: a path escapes `base`
/// - `RouteValidation`: a route file cannot be loaded or exports something invalid
/// - `DuplicateRoute`: two handlers resolve to the same pattern and method
/// - `ParamConflict`: two patterns bind differently named parameters at one position
/// - `MiddlewareValidation`: middleware cannot be loaded or is not async
/// - `RouteFilter`: both include and exclude are set, or a glob is malformed
pub fn discover(
    base: impl AsRef<Path>,
    options: &DiscoverOptions,
    loader: &dyn ModuleLoader,
) -> Result<RouteTable> {
    let base = base.as_ref();
    let filter = RouteFilter::new(&options.include, &options.exclude)?;
    let prefix = normalize_prefix(&options.prefix);
    let guard = SecurityGuard::new(base)?;

    let ScanOutcome { routes, middleware } =
        TreeWalker::new(&guard, &options.route_file, &options.middleware_file).scan()?;
    info!(
        root = %guard.root().display(),
        route_files = routes.len(),
        middleware_files = middleware.len(),
        "Scanned route tree"
    );

    let sites: Vec<RouteSite> = routes
        .into_iter()
        .filter(|site| {
            let keep = filter.allows(&site.relative);
            if !keep {
                debug!(dir = %site.relative, "Route directory filtered out");
            }
            keep
        })
        .collect();

    let directory_decls = load_directory_middleware(&filter, &sites, &middleware, loader)?;

    let mut loaded = Vec::with_capacity(sites.len());
    for site in &sites {
        loaded.push(load_site(site, &directory_decls, options, loader)?);
    }

    let mut candidates = Vec::new();
    for (site_index, (site, handlers)) in sites.iter().zip(&loaded).enumerate() {
        let patterns = expand_variants(&site.segments, prefix.as_deref()).map_err(|source| {
            RoutingError::PathParse {
                path: site.route_file.parent().unwrap_or(site.route_file.as_path()).to_path_buf(),
                source,
            }
        })?;
        for (export_index, handler) in handlers.iter().enumerate() {
            candidates.extend(patterns.iter().map(|pattern| RouteCandidate {
                pattern: pattern.clone(),
                method: handler.method,
                source: handler.source.clone(),
                site: site_index,
                export: export_index,
            }));
        }
    }

    check_duplicates(&candidates)?;
    check_param_conflicts(&candidates)?;

    let entries: Vec<RouteEntry> = candidates
        .into_iter()
        .map(|candidate| {
            let handler = &loaded[candidate.site][candidate.export];
            debug!(
                method = %candidate.method,
                pattern = %candidate.pattern,
                file = %handler.source.file.display(),
                middleware = handler.chain.len(),
                "Registered route"
            );
            RouteEntry {
                params: candidate.pattern.params(),
                pattern: candidate.pattern,
                method: candidate.method,
                chain: handler.chain.clone(),
                metadata: handler.metadata.clone(),
                source: candidate.source,
            }
        })
        .collect();

    let table = RouteTable::new(entries);
    info!(
        routes = table.len(),
        prefix = prefix.as_deref().unwrap_or("/"),
        "Route registration complete"
    );
    Ok(table)
}

/// Loads the middleware files that can apply to the selected sites
///
/// Without a filter every middleware file is loaded, so a broken one fails
/// discovery even where no route sits below it.
fn load_directory_middleware(
    filter: &RouteFilter,
    sites: &[RouteSite],
    middleware: &[MiddlewareSite],
    loader: &dyn ModuleLoader,
) -> Result<HashMap<PathBuf, MiddlewareDecl>> {
    let active = filter
        .is_active()
        .then(|| RouteFilter::active_directories(sites.iter().map(|s| s.relative.as_str())));

    let mut decls = HashMap::new();
    for site in middleware {
        if let Some(active) = &active {
            if !active.contains(&site.relative) {
                debug!(dir = %site.relative, "Middleware directory inactive");
                continue;
            }
        }

        let module = loader
            .load_middleware(&site.file)
            .map_err(|e| RoutingError::middleware(&site.file, e.to_string()))?;
        let decl = match module.middleware() {
            Some(binding) => validate_binding(binding, Scope::Directory, &site.file)?,
            None => MiddlewareDecl {
                scope: Scope::Directory,
                items: Vec::new(),
                source: site.file.clone(),
            },
        };
        debug!(
            file = %site.file.display(),
            middleware = decl.items.len(),
            "Loaded directory middleware"
        );
        decls.insert(site.file.clone(), decl);
    }

    Ok(decls)
}

/// Loads one route file and compiles its handlers
fn load_site(
    site: &RouteSite,
    directory_decls: &HashMap<PathBuf, MiddlewareDecl>,
    options: &DiscoverOptions,
    loader: &dyn ModuleLoader,
) -> Result<Vec<LoadedHandler>> {
    let file = &site.route_file;
    let module = loader
        .load_route(file)
        .map_err(|e| RoutingError::route(file, e.to_string()))?;

    let file_decl = module
        .middleware()
        .map(|binding| validate_binding(binding, Scope::File, file))
        .transpose()?;

    let lineage_params: Vec<&str> = site.segments.iter().filter_map(|s| s.kind.param()).collect();

    let mut handlers = Vec::new();
    for (export, route_handler) in module.exports() {
        if export.starts_with('_') {
            continue;
        }

        let method = RouteMethod::from_export(export).ok_or_else(|| {
            RoutingError::route(
                file,
                format!(
                    "unsupported export `{export}`; allowed: {} (prefix helpers with `_`)",
                    RouteMethod::allowed_exports()
                ),
            )
        })?;

        check_handler(file, export, method, route_handler, &lineage_params)?;

        let handler_decl = route_handler
            .config()
            .and_then(|config| config.middleware())
            .map(|binding| validate_binding(binding, Scope::Handler, file))
            .transpose()?;

        let decls = site
            .middleware_files
            .iter()
            .filter_map(|f| directory_decls.get(f))
            .chain(file_decl.as_ref())
            .chain(handler_decl.as_ref());
        let chain = Chain::compile(route_handler.handler(), decls);

        let metadata = resolve_metadata(
            method,
            route_handler,
            &module,
            &site.segments,
            &options.tag_skip_segments,
        );

        handlers.push(LoadedHandler {
            method,
            source: SourceLocation::new(file, export.as_str()),
            chain,
            metadata,
        });
    }

    if handlers.is_empty() {
        debug!(file = %file.display(), "Route file declares no handlers");
    }

    Ok(handlers)
}

fn check_handler(
    file: &Path,
    export: &str,
    method: RouteMethod,
    route_handler: &RouteHandler,
    lineage_params: &[&str],
) -> Result<()> {
    let handler = route_handler.handler();

    if method.is_websocket() && !handler.is_async() {
        return Err(RoutingError::route(
            file,
            format!("websocket handler `{export}` must be async"),
        ));
    }

    for param in handler.params() {
        if !is_identifier(param) {
            return Err(RoutingError::route(
                file,
                format!("handler `{export}` declares invalid parameter name `{param}`"),
            ));
        }
        if !lineage_params.contains(&param.as_str()) {
            return Err(RoutingError::route(
                file,
                format!("handler `{export}` declares parameter `{param}` that is not in the route path"),
            ));
        }
    }

    Ok(())
}
