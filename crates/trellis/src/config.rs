// File: src/config.rs
// Purpose: Configuration parsing from trellis.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trellis_router::{
    discover, DiscoverOptions, ModuleLoader, RouteTable, DEFAULT_MIDDLEWARE_FILE,
    DEFAULT_ROUTE_FILE,
};

pub const DEFAULT_CONFIG_FILE: &str = "trellis.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub routing: RoutingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Root of the route tree (default: "routes")
    #[serde(default = "default_routes_dir")]
    pub routes_dir: String,

    /// URL prefix for every route (e.g. "/api")
    #[serde(default)]
    pub prefix: String,

    /// Route directories to keep; exclusive with `exclude`
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_route_file")]
    pub route_file: String,

    #[serde(default = "default_middleware_file")]
    pub middleware_file: String,

    /// Static segments ignored when deriving tags
    #[serde(default)]
    pub tag_skip_segments: Vec<String>,
}

// Default values
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_routes_dir() -> String {
    "routes".to_string()
}

fn default_route_file() -> String {
    DEFAULT_ROUTE_FILE.to_string()
}

fn default_middleware_file() -> String {
    DEFAULT_MIDDLEWARE_FILE.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            routes_dir: default_routes_dir(),
            prefix: String::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            route_file: default_route_file(),
            middleware_file: default_middleware_file(),
            tag_skip_segments: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// A missing or empty file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from default path (./trellis.toml)
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_CONFIG_FILE)
    }

    pub fn routes_dir(&self) -> PathBuf {
        PathBuf::from(&self.routing.routes_dir)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn discover_options(&self) -> DiscoverOptions {
        let routing = &self.routing;
        DiscoverOptions::new()
            .with_prefix(routing.prefix.as_str())
            .with_include(routing.include.iter().cloned())
            .with_exclude(routing.exclude.iter().cloned())
            .with_route_file(routing.route_file.as_str())
            .with_middleware_file(routing.middleware_file.as_str())
            .with_tag_skip_segments(routing.tag_skip_segments.iter().cloned())
    }

    /// Runs discovery over the configured tree
    pub fn discover(&self, loader: &dyn ModuleLoader) -> Result<RouteTable> {
        let dir = self.routes_dir();
        discover(&dir, &self.discover_options(), loader)
            .with_context(|| format!("Failed to discover routes in {}", dir.display()))
    }
}
