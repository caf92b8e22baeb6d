mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::TreeArgs;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(version, about = "Trellis CLI - file-based route trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a route tree without the application's handlers
    Check {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// List the routes a tree compiles to
    Routes {
        #[command(flatten)]
        tree: TreeArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { tree } => {
            commands::check::execute(&tree)?;
        }
        Commands::Routes { tree, json } => {
            commands::routes::execute(&tree, json)?;
        }
    }

    Ok(())
}
