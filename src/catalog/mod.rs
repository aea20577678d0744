//! # Catalog Metadata
//!
//! Assembles STAC item and collection documents for GLM files.
//!
//! [`create_item`] is the orchestrator of the whole pipeline: it applies the
//! defect patches, validates the identification attributes, resolves the
//! spatial extent, harvests scalar properties, extracts and writes the three
//! record tables and finally reverts the patches.
//!
//! [`create_collection`] describes the collection the items belong to,
//! including the asset templates shared by all items.

mod collection;
mod error;
mod item;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::asset::AssetDescriptor;

pub use collection::{
    create_collection, CollectionExtent, CollectionMetadata, CollectionOptions, Provider,
    SpatialBoxes, TemporalIntervals, Thumbnail, DOI,
};
pub use error::CatalogError;
pub use item::{
    center_datetime, create_item, item_id, ItemMetadata, ItemOptions, EXPECTED_VARIABLE_COUNTS,
    OPERATIONAL_ENVIRONMENT,
};

/// STAC version of the produced documents
pub const STAC_VERSION: &str = "1.0.0";
/// GOES STAC extension
pub const GOES_EXTENSION: &str = "https://stac-extensions.github.io/goes/v1.0.0/schema.json";
/// Processing STAC extension
pub const PROCESSING_EXTENSION: &str =
    "https://stac-extensions.github.io/processing/v1.1.0/schema.json";
/// Projection STAC extension
pub const PROJECTION_EXTENSION: &str =
    "https://stac-extensions.github.io/projection/v1.1.0/schema.json";
/// Table STAC extension
pub const TABLE_EXTENSION: &str = "https://stac-extensions.github.io/table/v1.2.0/schema.json";
/// Scientific STAC extension
pub const SCIENTIFIC_EXTENSION: &str =
    "https://stac-extensions.github.io/scientific/v1.0.0/schema.json";
/// Item assets STAC extension
pub const ITEM_ASSETS_EXTENSION: &str =
    "https://stac-extensions.github.io/item-assets/v1.0.0/schema.json";

/// Mission of all GLM platforms
pub const MISSION: &str = "GOES";
/// Constellation of all GLM platforms
pub const CONSTELLATION: &str = "GOES";
/// Processing level of GLM L2 products
pub const PROCESSING_LEVEL: &str = "L2";
/// Nominal ground sample distance in metres
pub const RESOLUTION: u32 = 8000;
/// EPSG code of the item geometries
pub const TARGET_EPSG: u32 = 4326;
/// GLM flight models
pub const INSTRUMENTS: [&str; 3] = ["FM1", "FM2", "FM3"];

/// Asset key of the source file
pub const NETCDF_KEY: &str = "netcdf";
/// Title of the source file asset
pub const NETCDF_TITLE: &str = "Original netCDF 4 file";
/// Media type of the source file asset
pub const NETCDF_MEDIA_TYPE: &str = "application/netcdf";
/// Roles of the source file asset
pub const NETCDF_ROLES: [&str; 2] = ["data", "source"];

/// GOES-R series platform carrying the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// GOES-R
    G16,
    /// GOES-S
    G17,
    /// GOES-T
    G18,
}

impl Platform {
    /// All platforms
    pub const ALL: [Platform; 3] = [Platform::G16, Platform::G17, Platform::G18];

    /// Catalog name of the platform
    pub fn name(&self) -> &'static str {
        match self {
            Platform::G16 => "GOES-16",
            Platform::G17 => "GOES-17",
            Platform::G18 => "GOES-18",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = CatalogError;

    /// Parse the `platform_ID` attribute
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "G16" => Ok(Platform::G16),
            "G17" => Ok(Platform::G17),
            "G18" => Ok(Platform::G18),
            other => Err(CatalogError::InvalidPlatform(other.to_string())),
        }
    }
}

/// A link of a catalog document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Relation type
    pub rel: String,
    /// Target
    pub href: String,
    /// Media type of the target
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Link title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    /// Create a link
    pub fn new(rel: &str, href: &str, media_type: Option<&str>, title: &str) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.to_string(),
            media_type: media_type.map(str::to_string),
            title: Some(title.to_string()),
        }
    }
}

/// The source netCDF file as an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAsset {
    /// Location of the source file; absent in templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Asset title
    pub title: String,
    /// Media type
    #[serde(rename = "type")]
    pub media_type: String,
    /// Asset roles
    pub roles: Vec<String>,
    /// Creation time reported by the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl SourceAsset {
    /// Template form, without href and creation time
    pub fn template() -> Self {
        Self {
            href: None,
            title: NETCDF_TITLE.to_string(),
            media_type: NETCDF_MEDIA_TYPE.to_string(),
            roles: NETCDF_ROLES.iter().map(|r| r.to_string()).collect(),
            created: None,
        }
    }
}

/// An asset of an item or an item-asset template of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemAsset {
    /// A GeoParquet record table
    Table(AssetDescriptor),
    /// The source netCDF file
    Source(SourceAsset),
}
