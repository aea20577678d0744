use anyhow::{Context, Result};
use log::info;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use glmpeak::catalog::{create_collection, CollectionOptions};
use glmpeak::units::parse_instant;

/// Write the collection document
pub fn run(
    destination: PathBuf,
    id: String,
    start_time: Option<String>,
    license: Option<String>,
    thumbnail: Option<String>,
    no_geoparquet: bool,
    no_netcdf: bool,
) -> Result<()> {
    let start_time = start_time
        .as_deref()
        .map(parse_instant)
        .transpose()
        .context("Invalid --start-time")?;

    let collection = create_collection(&CollectionOptions {
        id,
        start_time,
        geoparquet: !no_geoparquet,
        netcdf_asset: !no_netcdf,
        license_href: license,
        thumbnail,
    });

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(&destination)
        .with_context(|| format!("Failed to create {}", destination.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &collection)?;

    info!("Collection {} written to {}", collection.id, destination.display());
    Ok(())
}
