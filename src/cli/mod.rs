use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod create_collection;
#[cfg(feature = "netcdf")]
mod create_item;
mod info;

/// glmpeak - GLM lightning detections as GeoParquet and STAC
#[derive(Parser)]
#[command(name = "glmpeak")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a STAC item and the GeoParquet tables of a GLM file
    #[cfg(feature = "netcdf")]
    CreateItem {
        /// GLM L2 netCDF file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Directory receiving the item JSON and the tables
        #[arg(value_name = "DESTINATION")]
        destination: PathBuf,

        /// Collection JSON the item refers to
        #[arg(long, value_name = "FILE")]
        collection: Option<PathBuf>,

        /// Do not write GeoParquet tables
        #[arg(long)]
        no_geoparquet: bool,

        /// Do not describe the netCDF file as an asset
        #[arg(long)]
        no_netcdf: bool,

        /// Keep the _Unsigned fixes in the source file
        #[arg(long)]
        fix_netcdf: bool,

        /// Keep the creation time in the item id
        #[arg(long)]
        append_ctime: bool,

        /// Fail on count and variable-count mismatches instead of warning
        #[arg(long)]
        strict: bool,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Compression level for ZSTD (1-22, default: 3)
        #[arg(short = 'c', long)]
        compression_level: Option<i32>,
    },

    /// Create the STAC collection document
    CreateCollection {
        /// Collection JSON path
        #[arg(value_name = "DESTINATION")]
        destination: PathBuf,

        /// Collection id
        #[arg(long, default_value = "goes-glm")]
        id: String,

        /// Start of the temporal extent (RFC 3339), defaults to now
        #[arg(long)]
        start_time: Option<String>,

        /// URL or path of the license
        #[arg(long)]
        license: Option<String>,

        /// URL of a PNG or JPEG thumbnail
        #[arg(long)]
        thumbnail: Option<String>,

        /// Leave out the GeoParquet item assets
        #[arg(long)]
        no_geoparquet: bool,

        /// Leave out the netCDF item asset
        #[arg(long)]
        no_netcdf: bool,
    },

    /// Display information about a written GeoParquet table
    Info {
        /// GeoParquet file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        #[cfg(feature = "netcdf")]
        Commands::CreateItem {
            source,
            destination,
            collection,
            no_geoparquet,
            no_netcdf,
            fix_netcdf,
            append_ctime,
            strict,
            config,
            compression_level,
        } => create_item::run(create_item::Args {
            source,
            destination,
            collection,
            no_geoparquet,
            no_netcdf,
            fix_netcdf,
            append_ctime,
            strict,
            config,
            compression_level,
        }),
        Commands::CreateCollection {
            destination,
            id,
            start_time,
            license,
            thumbnail,
            no_geoparquet,
            no_netcdf,
        } => create_collection::run(
            destination,
            id,
            start_time,
            license,
            thumbnail,
            no_geoparquet,
            no_netcdf,
        ),
        Commands::Info { file } => info::run(file),
    }
}
