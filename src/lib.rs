//! # glmpeak - GLM Lightning Detections as GeoParquet
//!
//! `glmpeak` converts GOES Geostationary Lightning Mapper (GLM) Level 2
//! netCDF files into one GeoParquet table per record kind (events, groups,
//! flashes) and describes each file with STAC catalog metadata.
//!
//! ## Key Features
//!
//! - **Schema-drift tolerant extraction**: both the 45- and the 48-variable
//!   file revisions are accepted; optional fields are skipped when absent.
//!
//! - **Temporal reconstruction**: `<kind>_time_offset` style variables are
//!   decoded against their `seconds since <instant>` unit into UTC timestamps.
//!
//! - **Defect repair**: offset variables missing the `_Unsigned` flag are
//!   patched for the duration of a conversion and restored afterwards.
//!
//! - **Deterministic output**: identical inputs give byte-identical files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glmpeak::catalog::{create_item, ItemOptions};
//! use glmpeak::container::MemoryContainer;
//! use std::path::Path;
//! # let dataset = glmpeak::container::Dataset::new();
//!
//! let mut container = MemoryContainer::new(dataset);
//! let item = create_item(&mut container, Path::new("out"), &ItemOptions::default())?;
//! println!("{} has {} assets", item.id, item.assets.len());
//! # Ok::<(), glmpeak::catalog::CatalogError>(())
//! ```
//!
//! This writes:
//! ```text
//! out/
//! ├── events.parquet
//! ├── groups.parquet
//! └── flashes.parquet
//! ```
//!
//! With the `netcdf` feature, `container::NetCdfContainer` opens GLM files
//! directly.
//!
//! ## Architecture
//!
//! - [`container`]: in-memory snapshot of a netCDF container and attribute patching
//! - [`patch`]: scoped repair of the `_Unsigned` defect
//! - [`units`]: epoch unit grammar and catalog unit normalisation
//! - [`record`]: field lists of the three record kinds
//! - [`extract`]: builds record tables with derived timestamps and point geometry
//! - [`geoparquet`]: GeoParquet writer and reader-side summary
//! - [`extent`]: orbital slot coverage, including the antimeridian split
//! - [`harvest`]: scalar variables as `goes:*` properties
//! - [`catalog`]: STAC item and collection assembly
//!
//! ## File Footer Metadata
//!
//! - `geo`: GeoParquet 1.0.0 metadata (primary column, WKB encoding, bbox)
//! - `glmpeak:columns`: JSON column descriptors (type label, description, unit)

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod asset;
pub mod catalog;
pub mod container;
pub mod extent;
pub mod extract;
pub mod geoparquet;
pub mod harvest;
pub mod patch;
pub mod record;
pub mod units;

#[cfg(test)]
mod test_support;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::asset::{AssetDescriptor, FieldDescriptor};
    pub use crate::catalog::{
        create_collection, create_item, CatalogError, CollectionMetadata, CollectionOptions,
        ItemMetadata, ItemOptions,
    };
    pub use crate::container::{Container, ContainerError, Dataset, MemoryContainer};
    #[cfg(feature = "netcdf")]
    pub use crate::container::NetCdfContainer;
    pub use crate::extent::{BoundingBox, Geometry, OrbitalSlot, SpatialExtent};
    pub use crate::extract::{convert, extract_kind, CountPolicy, ExtractError, RecordTable};
    pub use crate::geoparquet::{GeoParquetSummary, GeoParquetWriter, WriterConfig};
    pub use crate::patch::{with_patches, PatchSet};
    pub use crate::record::RecordKind;
}
