use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use glmpeak::catalog::{create_item, CatalogError, CollectionMetadata, ItemMetadata, ItemOptions};
use glmpeak::container::{ContainerError, NetCdfContainer};
use glmpeak::extract::CountPolicy;
use glmpeak::geoparquet::{CompressionType, WriterConfig};

use super::config::Config;

pub struct Args {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub collection: Option<PathBuf>,
    pub no_geoparquet: bool,
    pub no_netcdf: bool,
    pub fix_netcdf: bool,
    pub append_ctime: bool,
    pub strict: bool,
    pub config: Option<PathBuf>,
    pub compression_level: Option<i32>,
}

/// Create the item of a GLM file
pub fn run(args: Args) -> Result<()> {
    if !args.source.exists() {
        anyhow::bail!("Input file does not exist: {}", args.source.display());
    }

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .conversion;

    let defaults = WriterConfig::default();
    let writer = WriterConfig {
        compression: CompressionType::Zstd(
            args.compression_level
                .or(config.compression_level)
                .unwrap_or(3),
        ),
        row_group_size: config.row_group_size.unwrap_or(defaults.row_group_size),
        ..defaults
    };
    let strict = args.strict || config.strict.unwrap_or(false);
    let options = ItemOptions {
        geoparquet: !args.no_geoparquet && config.geoparquet.unwrap_or(true),
        netcdf_asset: !args.no_netcdf && config.netcdf.unwrap_or(true),
        source_href: Some(args.source.display().to_string()),
        keep_patches: args.fix_netcdf || config.fix_netcdf.unwrap_or(false),
        append_ctime: args.append_ctime || config.append_ctime.unwrap_or(false),
        count_policy: if strict { CountPolicy::Strict } else { CountPolicy::Lenient },
        writer,
    };

    info!("glmpeak - GLM L2 to STAC item");
    info!("Input:  {}", args.source.display());
    info!("Output: {}", args.destination.display());

    fs::create_dir_all(&args.destination).with_context(|| {
        format!("Failed to create directory: {}", args.destination.display())
    })?;

    let mut container = NetCdfContainer::open(&args.source)
        .with_context(|| format!("Failed to open {}", args.source.display()))?;
    let result = create_item(&mut container, &args.destination, &options);
    // Pending attribute deletions are applied on close
    let mut item = finish_item(result, container.close())?;

    if let Some(path) = &args.collection {
        let file = File::open(path)
            .with_context(|| format!("Failed to open collection: {}", path.display()))?;
        let collection: CollectionMetadata =
            serde_json::from_reader(file).context("Failed to parse collection JSON")?;
        item.set_collection(&collection, &path.display().to_string());
    }

    let output = args.destination.join(format!("{}.json", item.id));
    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &item)?;

    info!("Item {} written to {}", item.id, output.display());
    for key in item.assets.keys() {
        info!("  asset: {}", key);
    }
    Ok(())
}

/// Combine the item result with closing the source file.
///
/// A failed extraction is reported even when closing fails as well; the close
/// error is then only logged.
fn finish_item(
    result: Result<ItemMetadata, CatalogError>,
    closed: Result<(), ContainerError>,
) -> Result<ItemMetadata> {
    match (result, closed) {
        (Ok(item), Ok(())) => Ok(item),
        (Ok(_), Err(e)) => Err(e).context("Failed to restore the source file"),
        (Err(e), Ok(())) => Err(e).context("Item creation failed"),
        (Err(e), Err(close_err)) => {
            warn!("Failed to restore the source file: {}", close_err);
            Err(e).context("Item creation failed")
        }
    }
}
