pub mod check;
pub mod routes;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use trellis::{Config, DiscoverOptions, ManifestLoader, RouteTable, DEFAULT_CONFIG_FILE};

/// Where the tree lives and how to filter it
#[derive(Args, Debug, Clone, Default)]
pub struct TreeArgs {
    /// Route tree root (default: `routing.routes_dir` from the config file)
    pub dir: Option<PathBuf>,

    /// Config file to read defaults from
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// URL prefix for every route
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Keep only matching route directories (segment name or glob)
    #[arg(short, long, conflicts_with = "exclude")]
    pub include: Vec<String>,

    /// Drop matching route directories (segment name or glob)
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

impl TreeArgs {
    /// Config file values, overridden by whatever was passed on the command line
    pub fn resolve(&self) -> Result<(PathBuf, DiscoverOptions)> {
        let config = Config::load(&self.config)?;
        let dir = self.dir.clone().unwrap_or_else(|| config.routes_dir());

        let mut options = config.discover_options();
        if let Some(prefix) = &self.prefix {
            options.prefix = prefix.clone();
        }
        if !self.include.is_empty() {
            options.include = self.include.clone();
            options.exclude.clear();
        }
        if !self.exclude.is_empty() {
            options.exclude = self.exclude.clone();
            options.include.clear();
        }

        Ok((dir, options))
    }

    /// Discovers the tree with placeholder handlers and middleware
    pub fn discover(&self) -> Result<(PathBuf, RouteTable)> {
        let (dir, options) = self.resolve()?;
        let table = trellis::discover(&dir, &options, &ManifestLoader::lenient())?;
        Ok((dir, table))
    }
}
