//! # glmpeak
//!
//! Command-line tool that turns GLM L2 lightning files into GeoParquet tables
//! and STAC metadata.
//!
//! ## Usage
//!
//! ```bash
//! # Item plus events/groups/flashes tables (requires the netcdf feature)
//! glmpeak create-item OR_GLM-L2-LCFA_G16_s2020366.nc out/
//!
//! # Collection document
//! glmpeak create-collection out/collection.json --start-time 2017-02-28T00:16:52Z
//!
//! # Inspect a written table
//! glmpeak info out/events.parquet
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{dispatch, init_logging, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());
    dispatch(cli)
}
