use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use trellis::{RouteMethod, RouteSnapshot};

use super::TreeArgs;

pub fn execute(args: &TreeArgs, json: bool) -> Result<()> {
    let (dir, table) = args.discover()?;
    let snapshots = table.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        println!("{}", "No routes found".yellow());
        return Ok(());
    }

    let root = dir.canonicalize().unwrap_or(dir);
    let rows = rows(&snapshots, &root);
    let widths = column_widths(&rows);

    println!("{}", format_row(&HEADER.map(String::from), &widths).bold());
    for (row, snapshot) in rows.iter().zip(&snapshots) {
        let line = format_row(row, &widths);
        let line = match snapshot.method {
            RouteMethod::WebSocket => line.magenta(),
            _ if snapshot.metadata.deprecated => line.dimmed(),
            _ => line.normal(),
        };
        println!("{}", line);
    }
    println!();
    println!("{} routes", snapshots.len().to_string().cyan());

    Ok(())
}

const HEADER: [&str; 6] = ["METHOD", "PATTERN", "MW", "TAGS", "STATUS", "SOURCE"];

type Row = [String; 6];

fn rows(snapshots: &[RouteSnapshot], root: &Path) -> Vec<Row> {
    snapshots.iter().map(|s| row(s, root)).collect()
}

fn row(snapshot: &RouteSnapshot, root: &Path) -> Row {
    let source = Path::new(&snapshot.source);
    let source = source.strip_prefix(root).unwrap_or(source);

    [
        snapshot.method.to_string(),
        snapshot.pattern.clone(),
        snapshot.middleware.len().to_string(),
        snapshot.metadata.tags.join(","),
        snapshot
            .metadata
            .status_code
            .map_or_else(|| "-".to_string(), |code| code.to_string()),
        format!("{}:{}", source.display(), snapshot.export),
    ]
}

fn column_widths(rows: &[Row]) -> [usize; 6] {
    let mut widths = HEADER.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn format_row(row: &Row, widths: &[usize; 6]) -> String {
    row.iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
