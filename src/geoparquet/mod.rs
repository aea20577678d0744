//! # GeoParquet Writer
//!
//! Persists a [`RecordTable`] as a GeoParquet 1.0.0 file.
//!
//! ## Layout
//!
//! - Column `geometry`: little-endian WKB points, registered as the primary
//!   geometry column in the `geo` footer key
//! - The `geo` entry of the geometry column carries the table CRS as PROJJSON
//! - Attribute columns in table order; derived timestamps are stored as
//!   `Timestamp(Microsecond, "UTC")`
//! - Footer key `glmpeak:columns`: the JSON column descriptors, so a reader can
//!   rebuild the asset descriptor without the catalog
//!
//! No wall-clock value is written, so identical tables produce byte-identical
//! files.

mod config;
mod error;
mod summary;
pub mod wkb;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BinaryArray, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use log::debug;
use parquet::arrow::ArrowWriter;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::asset::{AssetDescriptor, GEOMETRY_COLUMN};
use crate::extract::{ColumnData, Point, RecordTable};
use crate::record::RecordKind;

pub use config::{CompressionType, WriterConfig};
pub use error::WriterError;
pub use summary::{read_geometry, GeoParquetSummary};

/// GeoParquet format version written to the `geo` key
pub const GEOPARQUET_VERSION: &str = "1.0.0";
/// Footer key of the GeoParquet metadata
pub const GEO_METADATA_KEY: &str = "geo";
/// Footer key of the JSON column descriptors
pub const COLUMNS_METADATA_KEY: &str = "glmpeak:columns";

/// Contents of the `geo` footer key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoMetadata {
    /// GeoParquet format version
    pub version: String,
    /// Name of the primary geometry column
    pub primary_column: String,
    /// Per geometry column metadata
    pub columns: BTreeMap<String, GeoColumnMetadata>,
}

/// Metadata of one geometry column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoColumnMetadata {
    /// Geometry encoding
    pub encoding: String,
    /// Geometry types present in the column
    pub geometry_types: Vec<String>,
    /// `[xmin, ymin, xmax, ymax]` of the finite points, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    /// PROJJSON of the coordinate reference system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,
}

impl GeoMetadata {
    /// Metadata for a point column covering `points` in the `crs` reference
    /// system (an `AUTHORITY:CODE` identifier)
    pub fn for_points(points: &[Point], crs: &str) -> Self {
        let column = GeoColumnMetadata {
            encoding: "WKB".to_string(),
            geometry_types: vec!["Point".to_string()],
            bbox: points_bbox(points),
            crs: crs_projjson(crs),
        };
        Self {
            version: GEOPARQUET_VERSION.to_string(),
            primary_column: GEOMETRY_COLUMN.to_string(),
            columns: BTreeMap::from([(GEOMETRY_COLUMN.to_string(), column)]),
        }
    }
}

/// Minimal PROJJSON identifying an `AUTHORITY:CODE` reference system
pub fn crs_projjson(crs: &str) -> Option<Value> {
    let (authority, code) = crs.split_once(':')?;
    let code = code.parse::<u32>().ok()?;
    Some(json!({ "id": { "authority": authority, "code": code } }))
}

fn points_bbox(points: &[Point]) -> Option<[f64; 4]> {
    points
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .fold(None, |acc, p| match acc {
            None => Some([p.x, p.y, p.x, p.y]),
            Some([xmin, ymin, xmax, ymax]) => {
                Some([xmin.min(p.x), ymin.min(p.y), xmax.max(p.x), ymax.max(p.y)])
            }
        })
}

/// Template asset descriptor of a record kind, for collection-level metadata
pub fn asset_template(kind: RecordKind) -> AssetDescriptor {
    AssetDescriptor::template(kind.asset_title())
}

/// Writes record tables as GeoParquet files
#[derive(Debug, Clone, Default)]
pub struct GeoParquetWriter {
    config: WriterConfig,
}

impl GeoParquetWriter {
    /// Create a writer with the given configuration
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Write `table` to `path` and describe the written file.
    ///
    /// The returned row count is the number of rows reported by the Parquet
    /// footer after closing the file.
    pub fn write(&self, table: &RecordTable, path: &Path) -> Result<AssetDescriptor, WriterError> {
        let rows = table.row_count();
        for column in &table.columns {
            if column.data.len() != rows {
                return Err(WriterError::InvalidData(format!(
                    "column {} holds {} values, expected {}",
                    column.name(),
                    column.data.len(),
                    rows
                )));
            }
        }

        let descriptors = table.descriptors();
        let footer = vec![
            (
                GEO_METADATA_KEY.to_string(),
                serde_json::to_string(&GeoMetadata::for_points(&table.geometry, table.crs))?,
            ),
            (
                COLUMNS_METADATA_KEY.to_string(),
                serde_json::to_string(&descriptors)?,
            ),
        ];

        let (schema, arrays) = build_arrays(table);
        let batch = RecordBatch::try_new(schema.clone(), arrays)?;

        let file = File::create(path)?;
        let props = self.config.to_writer_properties(&footer);
        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        if rows > 0 {
            writer.write(&batch)?;
        }
        let metadata = writer.close()?;
        let written = u64::try_from(metadata.num_rows).map_err(|_| {
            WriterError::InvalidData(format!("negative row count {}", metadata.num_rows))
        })?;
        debug!("Wrote {} rows to {}", written, path.display());

        Ok(AssetDescriptor::concrete(
            table.kind.asset_title(),
            path.display().to_string(),
            descriptors,
            written,
        ))
    }
}

fn build_arrays(table: &RecordTable) -> (Arc<Schema>, Vec<ArrayRef>) {
    let mut fields = Vec::with_capacity(table.columns.len() + 1);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns.len() + 1);

    let wkb: Vec<Vec<u8>> = table.geometry.iter().map(wkb::encode_point).collect();
    fields.push(Field::new(GEOMETRY_COLUMN, DataType::Binary, false));
    arrays.push(Arc::new(BinaryArray::from_iter_values(wkb.iter())));

    for column in &table.columns {
        let (data_type, nullable, array): (DataType, bool, ArrayRef) = match &column.data {
            ColumnData::Int64(v) => (DataType::Int64, true, Arc::new(Int64Array::from(v.clone()))),
            ColumnData::Float64(v) => {
                (DataType::Float64, true, Arc::new(Float64Array::from(v.clone())))
            }
            ColumnData::Utf8(v) => (
                DataType::Utf8,
                true,
                Arc::new(v.iter().map(|s| s.as_deref()).collect::<StringArray>()),
            ),
            ColumnData::Timestamp(v) => {
                let micros: Vec<i64> = v.iter().map(|t| t.timestamp_micros()).collect();
                (
                    DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
                    false,
                    Arc::new(TimestampMicrosecondArray::from(micros).with_timezone("UTC")),
                )
            }
        };
        fields.push(Field::new(column.name(), data_type, nullable));
        arrays.push(array);
    }

    (Arc::new(Schema::new(fields)), arrays)
}
