use anyhow::{Context, Result};
use std::path::PathBuf;

use glmpeak::geoparquet::GeoParquetSummary;

/// Display information about a GeoParquet table
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let summary = GeoParquetSummary::open(&file).context("Failed to read GeoParquet file")?;

    println!("GeoParquet File Information");
    println!("===========================");
    println!("File: {}", file.display());
    println!();

    println!("File Statistics:");
    println!("  Row groups: {}", summary.row_groups);
    println!("  Total rows: {}", summary.row_count);
    println!("  Primary geometry: {}", summary.primary_geometry());
    println!("  GeoParquet version: {}", summary.geo.version);
    if let Some(bbox) = summary
        .geo
        .columns
        .get(summary.primary_geometry())
        .and_then(|c| c.bbox.as_ref())
    {
        println!("  Bounding box: {:?}", bbox);
    }
    println!();

    println!("Columns:");
    match &summary.columns {
        Some(columns) => {
            for (i, col) in columns.iter().enumerate() {
                let unit = col.unit.as_deref().map(|u| format!(" [{}]", u)).unwrap_or_default();
                println!("  {:3}. {} ({}){}", i + 1, col.name, col.data_type, unit);
            }
        }
        None => {
            for (i, name) in summary.column_names.iter().enumerate() {
                println!("  {:3}. {}", i + 1, name);
            }
        }
    }

    Ok(())
}
