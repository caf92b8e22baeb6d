use anyhow::{Context, Result};
use colored::Colorize;

use super::TreeArgs;

pub fn execute(args: &TreeArgs) -> Result<()> {
    let (dir, table) = args
        .discover()
        .context("Route tree is invalid")?;

    let middleware = table.iter().filter(|entry| !entry.chain.is_empty()).count();

    println!(
        "{} {}",
        "✓".green().bold(),
        format!("{} is valid", dir.display()).bold()
    );
    println!(
        "  {} routes, {} with middleware",
        table.len().to_string().cyan(),
        middleware.to_string().cyan()
    );

    Ok(())
}
