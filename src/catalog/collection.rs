use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    ItemAsset, Link, Platform, SourceAsset, CONSTELLATION, GOES_EXTENSION, INSTRUMENTS,
    ITEM_ASSETS_EXTENSION, MISSION, NETCDF_KEY, PROCESSING_EXTENSION, PROCESSING_LEVEL,
    RESOLUTION, SCIENTIFIC_EXTENSION, STAC_VERSION, TABLE_EXTENSION,
};
use crate::extent::{collection_bboxes, BoundingBox, OrbitalSlot};
use crate::geoparquet::asset_template;
use crate::record::RecordKind;

const TITLE: &str = "GLM L2 Lightning Detections: Events, Groups, and Flashes";
const DESCRIPTION: &str = "The Lightning Detections: Events, Groups, and Flashes product \
consists of a hierarchy of earth-located lightning radiant energy measures including events, \
groups, and flashes. Lightning events are detected by the instrument. Lightning groups are a \
collection of one or more lightning events that satisfy temporal and spatial coincidence \
thresholds. Similarly, lightning flashes are a collection of one or more lightning groups that \
satisfy temporal and spatial coincidence thresholds. The product includes the relationship \
among lightning events, groups, and flashes, and the area coverage of lightning groups and \
flashes. The product also includes processing and data quality metadata, and satellite state \
and location information.";

const KEYWORDS: [&str; 10] = [
    "NOAA",
    "GOES",
    "GOES-16",
    "GOES-17",
    "GOES-18",
    "GLM",
    "Atmosphere",
    "Environmental",
    "Lightning",
    "Weather",
];

const PROVIDER_NAME: &str = "DOC/NOAA/NESDIS";
const PROVIDER_DESCRIPTION: &str = "Provided by:\n\n\
* U.S. Department of Commerce\n\
* National Oceanic and Atmospheric Administration\n\
* National Environmental Satellite, Data, and Information Services";
const PROVIDER_URL: &str = "https://www.goes.noaa.gov";

/// DOI of the GLM L2 product
pub const DOI: &str = "10.7289/V5KH0KK6";
const CITATION: &str = "GOES-R Algorithm Working Group and GOES-R Series Program, (2018): \
NOAA GOES-R Series Geostationary Lightning Mapper (GLM) Level 2 Lightning Detection: \
Events, Groups, and Flashes. [indicate subset used].\
NOAA National Centers for Environmental Information. doi:10.7289/V5KH0KK6. [access date].";

fn reference_links() -> Vec<Link> {
    vec![
        Link::new(
            "about",
            "https://www.ncei.noaa.gov/access/metadata/landing-page/bin/iso?id=gov.noaa.ncdc:C01527",
            Some("text/html"),
            "Product Landing Page",
        ),
        Link::new(
            "about",
            "https://www.goes-r.gov/users/docs/PUG-main-vol1.pdf",
            Some("application/pdf"),
            "Product Definition and Users' Guide (PUG) Vol.1 Main",
        ),
        Link::new(
            "about",
            "https://www.goes-r.gov/products/docs/PUG-L2+-vol5.pdf",
            Some("application/pdf"),
            "Product Definition and Users' Guide (PUG) Vol.5 Level 2+ Products",
        ),
    ]
}

/// Options of [`create_collection`]
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionOptions {
    /// Collection id
    pub id: String,
    /// Start of the temporal extent; the current time when absent
    pub start_time: Option<DateTime<Utc>>,
    /// Describe the GeoParquet item assets
    pub geoparquet: bool,
    /// Describe the netCDF item asset
    pub netcdf_asset: bool,
    /// Target of a `license` link
    pub license_href: Option<String>,
    /// URL of a PNG or JPEG preview image
    pub thumbnail: Option<String>,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            id: "goes-glm".to_string(),
            start_time: None,
            geoparquet: true,
            netcdf_asset: true,
            license_href: None,
            thumbnail: None,
        }
    }
}

/// A data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    /// Organisation name
    pub name: String,
    /// Provider roles
    pub roles: Vec<String>,
    /// Free-text description
    pub description: String,
    /// Homepage
    pub url: String,
}

/// Spatial and temporal extent of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionExtent {
    /// Spatial extent
    pub spatial: SpatialBoxes,
    /// Temporal extent
    pub temporal: TemporalIntervals,
}

/// Bounding boxes of a collection: the overall box first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialBoxes {
    /// Boxes
    pub bbox: Vec<BoundingBox>,
}

/// Open or closed time intervals; `None` marks an open end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalIntervals {
    /// Intervals as RFC 3339 strings
    pub interval: Vec<[Option<String>; 2]>,
}

/// Preview image of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Image location
    pub href: String,
    /// Asset title
    pub title: String,
    /// Media type
    #[serde(rename = "type")]
    pub media_type: String,
    /// Asset roles
    pub roles: Vec<String>,
}

/// A STAC collection of GLM items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// Always `Collection`
    #[serde(rename = "type")]
    pub type_: String,
    /// STAC version
    pub stac_version: String,
    /// Extension schemas in use
    pub stac_extensions: Vec<String>,
    /// Collection id
    pub id: String,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Keywords
    pub keywords: Vec<String>,
    /// License identifier
    pub license: String,
    /// Providers
    pub providers: Vec<Provider>,
    /// Extent
    pub extent: CollectionExtent,
    /// Value summaries of item properties
    pub summaries: BTreeMap<String, Value>,
    /// Links
    pub links: Vec<Link>,
    /// Collection-level assets
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub assets: BTreeMap<String, Thumbnail>,
    /// Templates of the assets every item carries
    pub item_assets: BTreeMap<String, ItemAsset>,
    /// DOI of the product
    #[serde(rename = "sci:doi")]
    pub doi: String,
    /// Citation of the product
    #[serde(rename = "sci:citation")]
    pub citation: String,
}

impl CollectionMetadata {
    /// Start of the temporal extent
    pub fn start_time(&self) -> Option<&str> {
        self.extent
            .temporal
            .interval
            .first()
            .and_then(|i| i[0].as_deref())
    }
}

/// Create the collection document
pub fn create_collection(options: &CollectionOptions) -> CollectionMetadata {
    let start = options.start_time.unwrap_or_else(Utc::now);

    let mut keywords: Vec<String> = KEYWORDS.iter().map(|k| k.to_string()).collect();
    if options.netcdf_asset {
        keywords.push("netCDF".to_string());
    }
    if options.geoparquet {
        keywords.push("GeoParquet".to_string());
    }

    let mut summaries = BTreeMap::new();
    summaries.insert("mission".to_string(), json!([MISSION]));
    summaries.insert("constellation".to_string(), json!([CONSTELLATION]));
    summaries.insert(
        "platform".to_string(),
        json!(Platform::ALL.iter().map(Platform::name).collect::<Vec<_>>()),
    );
    summaries.insert("instruments".to_string(), json!(INSTRUMENTS));
    summaries.insert("gsd".to_string(), json!([RESOLUTION]));
    summaries.insert("processing:level".to_string(), json!([PROCESSING_LEVEL]));
    summaries.insert(
        "goes:orbital_slot".to_string(),
        json!(OrbitalSlot::ALL.iter().map(OrbitalSlot::as_str).collect::<Vec<_>>()),
    );

    let mut links = Vec::new();
    if let Some(href) = &options.license_href {
        links.push(Link::new("license", href, None, "License"));
    }
    links.extend(reference_links());

    let mut assets = BTreeMap::new();
    if let Some(href) = &options.thumbnail {
        let media_type = if href.ends_with(".png") {
            "image/png"
        } else {
            "image/jpeg"
        };
        assets.insert(
            "thumbnail".to_string(),
            Thumbnail {
                href: href.clone(),
                title: "Preview".to_string(),
                media_type: media_type.to_string(),
                roles: vec!["thumbnail".to_string()],
            },
        );
    }

    let mut stac_extensions = vec![
        GOES_EXTENSION.to_string(),
        PROCESSING_EXTENSION.to_string(),
        SCIENTIFIC_EXTENSION.to_string(),
    ];
    let mut item_assets = BTreeMap::new();
    if options.geoparquet {
        stac_extensions.push(TABLE_EXTENSION.to_string());
        for kind in RecordKind::ALL {
            item_assets.insert(kind.asset_key(), ItemAsset::Table(asset_template(kind)));
        }
    }
    if options.netcdf_asset {
        item_assets.insert(
            NETCDF_KEY.to_string(),
            ItemAsset::Source(SourceAsset::template()),
        );
    }
    stac_extensions.push(ITEM_ASSETS_EXTENSION.to_string());

    CollectionMetadata {
        type_: "Collection".to_string(),
        stac_version: STAC_VERSION.to_string(),
        stac_extensions,
        id: options.id.clone(),
        title: TITLE.to_string(),
        description: DESCRIPTION.to_string(),
        keywords,
        license: "proprietary".to_string(),
        providers: vec![Provider {
            name: PROVIDER_NAME.to_string(),
            roles: vec!["producer".to_string(), "licensor".to_string()],
            description: PROVIDER_DESCRIPTION.to_string(),
            url: PROVIDER_URL.to_string(),
        }],
        extent: CollectionExtent {
            spatial: SpatialBoxes {
                bbox: collection_bboxes(),
            },
            temporal: TemporalIntervals {
                interval: vec![[Some(start.to_rfc3339_opts(SecondsFormat::AutoSi, true)), None]],
            },
        },
        summaries,
        links,
        assets,
        item_assets,
        doi: DOI.to_string(),
        citation: CITATION.to_string(),
    }
}
