//! TOML manifests resolved against a [`Registry`]
//!
//! ```toml
//! # route.toml
//! tags = ["users"]
//! middleware = ["audit"]
//!
//! [handlers]
//! get = "users.list"
//!
//! [handlers.post]
//! handler = "users.create"
//! middleware = "rate_limit"
//! status_code = 202
//! ```
//!
//! ```toml
//! # _middleware.toml
//! middleware = ["timing", "auth"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use axum::http::StatusCode;
use serde::Deserialize;
use toml::Value;

use super::{LoadError, MiddlewareModule, ModuleLoader, Registry, RouteModule};
use crate::handler::{Handler, RouteConfig, RouteHandler};
use crate::middleware::{Middleware, MiddlewareBinding, Next};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteManifest {
    tags: Option<Vec<String>>,
    summary: Option<String>,
    deprecated: Option<bool>,
    middleware: Option<Value>,
    #[serde(default)]
    handlers: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfiguredManifest {
    handler: String,
    middleware: Option<Value>,
    tags: Option<Vec<String>>,
    summary: Option<String>,
    deprecated: Option<bool>,
    status_code: Option<u16>,
    params: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MiddlewareManifest {
    middleware: Option<Value>,
}

/// [`ModuleLoader`] for `route.toml` / `_middleware.toml` manifests
#[derive(Clone, Debug, Default)]
pub struct ManifestLoader {
    registry: Registry,
    lenient: bool,
}

impl ManifestLoader {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            lenient: false,
        }
    }

    /// Resolves unknown names to placeholders instead of failing
    ///
    /// Placeholder handlers answer `501 Not Implemented`; placeholder
    /// middleware pass requests through. Manifest syntax is still checked.
    pub fn lenient() -> Self {
        Self {
            registry: Registry::new(),
            lenient: true,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    fn resolve_handler(&self, name: &str) -> Result<Handler, LoadError> {
        if let Some(handler) = self.registry.handler(name) {
            return Ok(handler.clone());
        }
        if self.registry.middleware(name).is_some() {
            return Err(LoadError::Invalid(format!(
                "`{name}` is registered as a middleware, not a handler"
            )));
        }
        if self.lenient {
            return Ok(Handler::new(|_req| async { StatusCode::NOT_IMPLEMENTED }));
        }
        Err(LoadError::Invalid(format!("unknown handler `{name}`")))
    }

    fn resolve_middleware(&self, name: &str) -> Result<Middleware, LoadError> {
        if let Some(middleware) = self.registry.middleware(name) {
            return Ok(middleware.clone());
        }
        if self.registry.handler(name).is_some() {
            return Err(LoadError::Invalid(format!(
                "`{name}` is registered as a handler, not a middleware"
            )));
        }
        if self.lenient {
            return Ok(Middleware::new(|req, next: Next| next.run(req)).named(name));
        }
        Err(LoadError::Invalid(format!("unknown middleware `{name}`")))
    }

    fn resolve_binding(&self, value: &Value) -> Result<MiddlewareBinding, LoadError> {
        match value {
            Value::String(name) => self.resolve_middleware(name).map(MiddlewareBinding::Single),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::String(name) => self.resolve_middleware(name),
                    other => Err(LoadError::Invalid(format!(
                        "non-callable middleware at index {index}: expected a name, found {}",
                        other.type_str()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(MiddlewareBinding::List),
            other => Err(LoadError::Invalid(format!(
                "`middleware` must be a name or a list of names, found {}",
                other.type_str()
            ))),
        }
    }

    fn resolve_export(&self, export: &str, value: Value) -> Result<RouteHandler, LoadError> {
        match value {
            Value::String(name) => self.resolve_handler(&name).map(RouteHandler::Plain),
            Value::Table(_) => {
                let manifest: ConfiguredManifest = value.try_into().map_err(|e| {
                    LoadError::Invalid(format!("handler `{export}`: {e}"))
                })?;
                self.resolve_configured(manifest).map(RouteHandler::Configured)
            }
            other => Err(LoadError::Invalid(format!(
                "handler `{export}` must be a name or a table, found {}",
                other.type_str()
            ))),
        }
    }

    fn resolve_configured(&self, manifest: ConfiguredManifest) -> Result<RouteConfig, LoadError> {
        let mut handler = self.resolve_handler(&manifest.handler)?;
        if let Some(params) = manifest.params {
            handler = handler.with_params(params);
        }

        let mut config = RouteConfig::new(handler);
        if let Some(value) = &manifest.middleware {
            config = config.with_middleware(self.resolve_binding(value)?);
        }
        if let Some(tags) = manifest.tags {
            config = config.with_tags(tags);
        }
        if let Some(summary) = manifest.summary {
            config = config.with_summary(summary);
        }
        if let Some(deprecated) = manifest.deprecated {
            config = config.with_deprecated(deprecated);
        }
        if let Some(status_code) = manifest.status_code {
            config = config.with_status_code(status_code);
        }
        Ok(config)
    }
}

impl ModuleLoader for ManifestLoader {
    fn load_route(&self, file: &Path) -> Result<RouteModule, LoadError> {
        let text = fs::read_to_string(file)?;
        let manifest: RouteManifest = toml::from_str(&text)?;

        let mut module = RouteModule::new();
        for (export, value) in manifest.handlers {
            if export.starts_with('_') {
                continue;
            }
            let handler = self.resolve_export(&export, value)?;
            module = module.with_export(export, handler);
        }
        if let Some(value) = &manifest.middleware {
            module = module.with_middleware(self.resolve_binding(value)?);
        }
        if let Some(tags) = manifest.tags {
            module = module.with_tags(tags);
        }
        if let Some(summary) = manifest.summary {
            module = module.with_summary(summary);
        }
        if let Some(deprecated) = manifest.deprecated {
            module = module.with_deprecated(deprecated);
        }
        Ok(module)
    }

    fn load_middleware(&self, file: &Path) -> Result<MiddlewareModule, LoadError> {
        let text = fs::read_to_string(file)?;
        let manifest: MiddlewareManifest = toml::from_str(&text)?;

        let mut module = MiddlewareModule::new();
        if let Some(value) = &manifest.middleware {
            module = module.with_middleware(self.resolve_binding(value)?);
        }
        Ok(module)
    }
}
