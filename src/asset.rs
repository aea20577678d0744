//! Asset and column descriptors attached to catalog metadata.
//!
//! The serialized field names follow the STAC `table` extension so the
//! descriptors can be embedded verbatim in item and collection documents.

use serde::{Deserialize, Serialize};

/// Media type of the GeoParquet assets
pub const PARQUET_MEDIA_TYPE: &str = "application/x-parquet";
/// Roles of the GeoParquet assets
pub const PARQUET_ROLES: [&str; 2] = ["data", "cloud-optimized"];
/// Name of the geometry column in every record table
pub const GEOMETRY_COLUMN: &str = "geometry";
/// Logical type label of derived timestamp columns
pub const DATETIME_TYPE: &str = "datetime";
/// Geometry type label used when the container does not declare `featureType`
pub const DEFAULT_GEOMETRY_TYPE: &str = "point";

/// Description of one table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Column name
    pub name: String,
    /// Type label: storage type of the source variable, `datetime` for derived
    /// timestamps, or the feature type for the geometry column
    #[serde(rename = "type")]
    pub data_type: String,
    /// Long name of the source variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit after catalog normalisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl FieldDescriptor {
    /// Descriptor with only a name and a type label
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            description: None,
            unit: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Set the unit
    pub fn with_unit(mut self, unit: Option<String>) -> Self {
        self.unit = unit;
        self
    }
}

/// Description of one GeoParquet asset.
///
/// A *concrete* descriptor carries an href, the column list and the row count
/// of a written file. A *template* descriptor omits all three and describes
/// the asset type at collection level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Human-readable title
    pub title: String,
    /// Media type
    #[serde(rename = "type")]
    pub media_type: String,
    /// Asset roles
    pub roles: Vec<String>,
    /// Name of the primary geometry column
    #[serde(rename = "table:primary_geometry")]
    pub primary_geometry: String,
    /// Location of the written file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Columns in physical order
    #[serde(rename = "table:columns", default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<FieldDescriptor>,
    /// Rows actually written
    #[serde(rename = "table:row_count", default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

impl AssetDescriptor {
    /// Collection-level template for an asset type
    pub fn template(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            media_type: PARQUET_MEDIA_TYPE.to_string(),
            roles: PARQUET_ROLES.iter().map(|r| r.to_string()).collect(),
            primary_geometry: GEOMETRY_COLUMN.to_string(),
            href: None,
            columns: Vec::new(),
            row_count: None,
        }
    }

    /// Descriptor for a written file
    pub fn concrete(
        title: impl Into<String>,
        href: impl Into<String>,
        columns: Vec<FieldDescriptor>,
        row_count: u64,
    ) -> Self {
        Self {
            href: Some(href.into()),
            columns,
            row_count: Some(row_count),
            ..Self::template(title)
        }
    }

    /// Whether this is a template (no href and no row count)
    pub fn is_template(&self) -> bool {
        self.href.is_none() && self.row_count.is_none()
    }

    /// Column names in physical order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
