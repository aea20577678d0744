use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    CatalogError, CollectionMetadata, ItemAsset, Link, Platform, SourceAsset, CONSTELLATION,
    GOES_EXTENSION, MISSION, NETCDF_KEY, PROCESSING_EXTENSION, PROCESSING_LEVEL,
    PROJECTION_EXTENSION, RESOLUTION, STAC_VERSION, TABLE_EXTENSION, TARGET_EPSG,
};
use crate::container::{Container, Dataset};
use crate::extent::{BoundingBox, Geometry, OrbitalSlot};
use crate::extract::{convert, CountPolicy};
use crate::geoparquet::WriterConfig;
use crate::harvest::harvest;
use crate::patch::with_patches;
use crate::units::parse_instant;

/// Variable counts of the known GLM file revisions
pub const EXPECTED_VARIABLE_COUNTS: [usize; 2] = [45, 48];
/// System environment prefix of operational data
pub const OPERATIONAL_ENVIRONMENT: &str = "OR";

static CREATION_TIME_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"_c\d+$").unwrap_or_else(|e| panic!("invalid creation time pattern: {e}"))
});

/// Options of [`create_item`]
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOptions {
    /// Write the three GeoParquet tables and describe them as assets
    pub geoparquet: bool,
    /// Describe the source file as an asset
    pub netcdf_asset: bool,
    /// Location of the source file used as the netCDF asset href
    pub source_href: Option<String>,
    /// Leave the defect patches in the source file
    pub keep_patches: bool,
    /// Keep the `_c<creation time>` suffix in the item id
    pub append_ctime: bool,
    /// Treatment of row count and variable count mismatches
    pub count_policy: CountPolicy,
    /// GeoParquet writer settings
    pub writer: WriterConfig,
}

impl Default for ItemOptions {
    fn default() -> Self {
        Self {
            geoparquet: true,
            netcdf_asset: true,
            source_href: None,
            keep_patches: false,
            append_ctime: false,
            count_policy: CountPolicy::default(),
            writer: WriterConfig::default(),
        }
    }
}

/// A STAC item describing one GLM file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Always `Feature`
    #[serde(rename = "type")]
    pub type_: String,
    /// STAC version
    pub stac_version: String,
    /// Extension schemas in use
    pub stac_extensions: Vec<String>,
    /// Item id derived from the dataset name
    pub id: String,
    /// Coverage geometry of the orbital slot
    pub geometry: Option<Geometry>,
    /// Coverage bounding box of the orbital slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    /// Item properties, including `datetime`
    pub properties: BTreeMap<String, Value>,
    /// Links
    pub links: Vec<Link>,
    /// Assets by key
    pub assets: BTreeMap<String, ItemAsset>,
    /// Parent collection id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl ItemMetadata {
    /// The nominal item datetime
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.properties
            .get("datetime")
            .and_then(Value::as_str)
            .and_then(|s| parse_instant(s).ok())
    }

    /// Attach the item to a collection without adding it to the collection
    pub fn set_collection(&mut self, collection: &CollectionMetadata, href: &str) {
        self.collection = Some(collection.id.clone());
        self.links.retain(|link| link.rel != "collection");
        self.links.push(Link::new(
            "collection",
            href,
            Some("application/json"),
            &collection.title,
        ));
    }
}

/// Create the item of a GLM file, writing its record tables into `dest_dir`.
///
/// Defect patches are applied for the duration of the call and reverted on
/// every exit path unless [`ItemOptions::keep_patches`] is set.
pub fn create_item<C: Container + ?Sized>(
    container: &mut C,
    dest_dir: &Path,
    options: &ItemOptions,
) -> Result<ItemMetadata, CatalogError> {
    with_patches(container, options.keep_patches, |c| {
        build_item(c.dataset(), dest_dir, options)
    })
}

/// Item id from a `dataset_name` attribute
pub fn item_id(dataset_name: &str, append_ctime: bool) -> String {
    let id = dataset_name.replace(".nc", "");
    if append_ctime {
        id
    } else {
        CREATION_TIME_SUFFIX.replace(&id, "").into_owned()
    }
}

/// Midpoint of two ISO instants
pub fn center_datetime(start: &str, end: &str) -> Result<DateTime<Utc>, CatalogError> {
    let parse = |attribute: &str, value: &str| {
        parse_instant(value).map_err(|source| CatalogError::InvalidDatetime {
            attribute: attribute.to_string(),
            source,
        })
    };
    let a = parse("time_coverage_start", start)?;
    let b = parse("time_coverage_end", end)?;
    Ok(a + (b - a) / 2)
}

fn required<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a str, CatalogError> {
    dataset
        .text_attribute(name)
        .ok_or_else(|| CatalogError::MissingAttribute(name.to_string()))
}

fn build_item(
    dataset: &Dataset,
    dest_dir: &Path,
    options: &ItemOptions,
) -> Result<ItemMetadata, CatalogError> {
    let id = item_id(required(dataset, "dataset_name")?, options.append_ctime);
    let system_environment: String = id.chars().take(2).collect();
    if system_environment != OPERATIONAL_ENVIRONMENT {
        warn!("You are ingesting test data (system environment {})", system_environment);
    }

    let var_count = dataset.variables.len();
    if !EXPECTED_VARIABLE_COUNTS.contains(&var_count) {
        if options.count_policy == CountPolicy::Strict {
            return Err(CatalogError::UnexpectedVariableCount(var_count));
        }
        warn!(
            "The number of variables is expected to be 45 or 48, but it is {}",
            var_count
        );
    }

    let start = required(dataset, "time_coverage_start")?;
    let end = required(dataset, "time_coverage_end")?;
    let datetime = center_datetime(start, end)?;

    let platform: Platform = required(dataset, "platform_ID")?.parse()?;
    let slot_value = required(dataset, "orbital_slot")?;
    let slot: OrbitalSlot = slot_value
        .parse()
        .map_err(|_| CatalogError::InvalidOrbitalSlot(slot_value.to_string()))?;

    let mut properties = BTreeMap::new();
    properties.insert(
        "datetime".to_string(),
        json!(datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    );
    properties.insert("start_datetime".to_string(), json!(start));
    properties.insert("end_datetime".to_string(), json!(end));
    properties.insert("mission".to_string(), json!(MISSION));
    properties.insert("constellation".to_string(), json!(CONSTELLATION));
    properties.insert("platform".to_string(), json!(platform.name()));
    properties.insert(
        "instruments".to_string(),
        json!([required(dataset, "instrument_ID")?]),
    );
    properties.insert("gsd".to_string(), json!(RESOLUTION));
    properties.insert("processing:level".to_string(), json!(PROCESSING_LEVEL));
    properties.insert(
        "processing:facility".to_string(),
        json!(required(dataset, "production_site")?),
    );
    properties.insert("goes:orbital_slot".to_string(), json!(slot.as_str()));
    properties.insert(
        "goes:system_environment".to_string(),
        json!(system_environment),
    );

    let extent = slot.spatial_extent();

    let harvested = harvest(dataset)?;
    properties.extend(harvested.properties);
    properties.insert("proj:epsg".to_string(), json!(TARGET_EPSG));
    if let Some(centroid) = harvested.centroid {
        properties.insert("proj:centroid".to_string(), json!(centroid));
    }

    let mut stac_extensions = vec![
        GOES_EXTENSION.to_string(),
        PROCESSING_EXTENSION.to_string(),
        PROJECTION_EXTENSION.to_string(),
    ];
    let mut assets = BTreeMap::new();

    if options.geoparquet {
        stac_extensions.push(TABLE_EXTENSION.to_string());
        for (key, asset) in convert(dataset, dest_dir, options.count_policy, &options.writer)? {
            assets.insert(key, ItemAsset::Table(asset));
        }
    }

    if options.netcdf_asset {
        let asset = SourceAsset {
            href: options.source_href.clone(),
            created: dataset.text_attribute("date_created").map(str::to_string),
            ..SourceAsset::template()
        };
        assets.insert(NETCDF_KEY.to_string(), ItemAsset::Source(asset));
    }

    info!("Created item {} with {} assets", id, assets.len());
    Ok(ItemMetadata {
        type_: "Feature".to_string(),
        stac_version: STAC_VERSION.to_string(),
        stac_extensions,
        id,
        geometry: Some(extent.geometry),
        bbox: Some(extent.bbox),
        properties,
        links: Vec::new(),
        assets,
        collection: None,
    })
}
