//! # Record Extractor
//!
//! Builds one columnar [`RecordTable`] per record kind from a container
//! snapshot:
//!
//! 1. The declared `<kind>_count` is reconciled with the coordinate arrays
//!    according to the [`CountPolicy`].
//! 2. One point per row is built from `(<kind>_lon, <kind>_lat)`.
//! 3. Every remaining field is decoded from `<kind>_<field>`. Offset fields
//!    whose unit follows the epoch grammar additionally produce a timestamp
//!    column placed right before the offset column.
//!
//! [`convert`] runs the extraction for all three kinds and hands each table to
//! the GeoParquet writer.

mod error;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::asset::{AssetDescriptor, FieldDescriptor, DATETIME_TYPE, DEFAULT_GEOMETRY_TYPE, GEOMETRY_COLUMN};
use crate::container::{Dataset, Scalar, Values, Variable, LONG_NAME_ATTRIBUTE, UNITS_ATTRIBUTE};
use crate::geoparquet::{GeoParquetWriter, WriterConfig};
use crate::record::{is_coordinate_field, is_optional_field, RecordKind};
use crate::units::{catalog_unit, EpochUnit};

pub use error::ExtractError;

/// Coordinate reference system of the GLM coordinate arrays
pub const SOURCE_CRS: &str = "EPSG:4326";

/// Global attribute naming the geometry type of the records
pub const FEATURE_TYPE_ATTRIBUTE: &str = "featureType";

/// How to treat a declared row count that disagrees with the coordinate arrays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountPolicy {
    /// Use the coordinate-array length and log a warning
    #[default]
    Lenient,
    /// Fail with [`ExtractError::CountMismatch`]
    Strict,
}

/// A point geometry; `x` is the longitude and `y` the latitude.
///
/// Masked coordinates are carried as NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Longitude in degrees
    pub x: f64,
    /// Latitude in degrees
    pub y: f64,
}

/// Decoded values of one column; `None` marks a masked value
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Integer values stored without packing
    Int64(Vec<Option<i64>>),
    /// Floating point or unpacked values
    Float64(Vec<Option<f64>>),
    /// Text values
    Utf8(Vec<Option<String>>),
    /// Timestamps derived from epoch offsets
    Timestamp(Vec<DateTime<Utc>>),
}

impl ColumnData {
    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
            ColumnData::Timestamp(v) => v.len(),
        }
    }

    /// Whether the column holds no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Values> for ColumnData {
    fn from(values: Values) -> Self {
        match values {
            Values::Int(v) => ColumnData::Int64(v),
            Values::Float(v) => ColumnData::Float64(v),
            Values::Text(v) => ColumnData::Utf8(v),
        }
    }
}

/// A named column with its catalog descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Catalog descriptor; `descriptor.name` is the column name
    pub descriptor: FieldDescriptor,
    /// Column values
    pub data: ColumnData,
}

impl Column {
    /// Column name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// The extracted table of one record kind
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable {
    /// Record kind the rows belong to
    pub kind: RecordKind,
    /// Coordinate reference system of the geometry column
    pub crs: &'static str,
    /// Descriptor of the geometry column
    pub geometry_descriptor: FieldDescriptor,
    /// One point per row
    pub geometry: Vec<Point>,
    /// Attribute columns in output order
    pub columns: Vec<Column>,
}

impl RecordTable {
    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.geometry.len()
    }

    /// Descriptors of all columns in physical order, geometry first
    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        std::iter::once(self.geometry_descriptor.clone())
            .chain(self.columns.iter().map(|c| c.descriptor.clone()))
            .collect()
    }

    /// Column lookup by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }
}

/// Extract the full field list of a record kind
pub fn extract_kind(
    dataset: &Dataset,
    kind: RecordKind,
    policy: CountPolicy,
) -> Result<RecordTable, ExtractError> {
    extract(dataset, kind, kind.fields(), policy)
}

/// Extract the given fields of a record kind.
///
/// `lat`/`lon` entries in `fields` are consumed by the geometry column; the
/// coordinate variables are read regardless.
pub fn extract(
    dataset: &Dataset,
    kind: RecordKind,
    fields: &[&str],
    policy: CountPolicy,
) -> Result<RecordTable, ExtractError> {
    let declared = declared_count(dataset, kind)?;

    let lat = required_variable(dataset, &kind.variable_name("lat"))?
        .values()?
        .to_f64();
    let lon = required_variable(dataset, &kind.variable_name("lon"))?
        .values()?
        .to_f64();
    let rows = reconcile_count(kind, declared, lat.len(), lon.len(), policy)?;

    let geometry: Vec<Point> = lon
        .iter()
        .zip(lat.iter())
        .map(|(x, y)| Point {
            x: x.unwrap_or(f64::NAN),
            y: y.unwrap_or(f64::NAN),
        })
        .collect();

    let geometry_type = dataset
        .text_attribute(FEATURE_TYPE_ATTRIBUTE)
        .unwrap_or(DEFAULT_GEOMETRY_TYPE);

    let mut columns = Vec::with_capacity(fields.len());
    for field in fields.iter().copied().filter(|f| !is_coordinate_field(f)) {
        let name = kind.variable_name(field);
        let Some(variable) = dataset.variable(&name) else {
            if is_optional_field(field) {
                debug!("Optional variable {} not present, skipping", name);
                continue;
            }
            return Err(ExtractError::MissingVariable(name));
        };
        columns.extend(field_columns(field, variable, rows)?);
    }

    info!("Extracted {} {} records", rows, kind);
    Ok(RecordTable {
        kind,
        crs: SOURCE_CRS,
        geometry_descriptor: FieldDescriptor::new(GEOMETRY_COLUMN, geometry_type),
        geometry,
        columns,
    })
}

/// Extract all record kinds and write one GeoParquet file per kind into `dest_dir`.
///
/// Returns the concrete asset descriptors keyed by asset key.
pub fn convert(
    dataset: &Dataset,
    dest_dir: &Path,
    policy: CountPolicy,
    config: &WriterConfig,
) -> Result<BTreeMap<String, AssetDescriptor>, ExtractError> {
    std::fs::create_dir_all(dest_dir).map_err(crate::geoparquet::WriterError::from)?;

    let mut assets = BTreeMap::new();
    for kind in RecordKind::ALL {
        let table = extract_kind(dataset, kind, policy)?;
        let path = dest_dir.join(kind.file_name());
        let asset = GeoParquetWriter::new(config.clone()).write(&table, &path)?;
        assets.insert(kind.asset_key(), asset);
    }
    Ok(assets)
}

fn required_variable<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Variable, ExtractError> {
    dataset
        .variable(name)
        .ok_or_else(|| ExtractError::MissingVariable(name.to_string()))
}

/// Value of `<kind>_count`, or 0 when it is absent or not a non-negative integer
fn declared_count(dataset: &Dataset, kind: RecordKind) -> Result<usize, ExtractError> {
    let name = kind.count_variable();
    let Some(variable) = dataset.variable(&name) else {
        warn!("Variable {} not found, assuming 0 records", name);
        return Ok(0);
    };
    let count = match variable.scalar_value()? {
        Some(Scalar::Int(n)) if n >= 0 => usize::try_from(n).ok(),
        Some(Scalar::Float(f)) if f >= 0.0 && f.fract() == 0.0 => Some(f as usize),
        _ => None,
    };
    Ok(count.unwrap_or_else(|| {
        warn!("Variable {} is not an integer scalar, assuming 0 records", name);
        0
    }))
}

fn reconcile_count(
    kind: RecordKind,
    declared: usize,
    lat: usize,
    lon: usize,
    policy: CountPolicy,
) -> Result<usize, ExtractError> {
    if lat != lon {
        return Err(ExtractError::CoordinateLengthMismatch { kind, lat, lon });
    }
    if lat != declared {
        if policy == CountPolicy::Strict {
            return Err(ExtractError::CountMismatch {
                kind,
                declared,
                actual: lat,
            });
        }
        warn!(
            "{} declares {} rows but coordinate arrays hold {}; using {}",
            kind.count_variable(),
            declared,
            lat,
            lat
        );
    }
    Ok(lat)
}

/// Columns produced by one field: an optional derived timestamp column, then the field itself
fn field_columns(
    field: &str,
    variable: &Variable,
    rows: usize,
) -> Result<Vec<Column>, ExtractError> {
    let values = variable.values()?;
    if values.len() != rows {
        return Err(ExtractError::FieldLengthMismatch {
            variable: variable.name.clone(),
            expected: rows,
            actual: values.len(),
        });
    }

    let unit = variable.text_attribute(UNITS_ATTRIBUTE);
    let descriptor = FieldDescriptor::new(field, variable.data_type().label())
        .with_description(variable.text_attribute(LONG_NAME_ATTRIBUTE).map(str::to_string))
        .with_unit(unit.and_then(catalog_unit));

    let mut columns = Vec::with_capacity(2);
    let epoch = match unit {
        Some(unit) => EpochUnit::parse(unit).map_err(|source| ExtractError::InvalidEpoch {
            variable: variable.name.clone(),
            source,
        })?,
        None => None,
    };
    if let Some(epoch) = epoch {
        columns.push(Column {
            descriptor: FieldDescriptor::new(field.replace("_offset", ""), DATETIME_TYPE),
            data: ColumnData::Timestamp(timestamps(&variable.name, &values, &epoch)?),
        });
    }

    columns.push(Column {
        descriptor,
        data: values.into(),
    });
    Ok(columns)
}

fn timestamps(
    variable: &str,
    values: &Values,
    epoch: &EpochUnit,
) -> Result<Vec<DateTime<Utc>>, ExtractError> {
    let decode_error = |value: String| ExtractError::TemporalDecode {
        variable: variable.to_string(),
        value,
    };
    let offsets: Vec<f64> = match values {
        Values::Int(v) => v
            .iter()
            .map(|x| x.map(|x| x as f64).ok_or_else(|| decode_error("--".to_string())))
            .collect::<Result<_, _>>()?,
        Values::Float(v) => v
            .iter()
            .map(|x| x.ok_or_else(|| decode_error("--".to_string())))
            .collect::<Result<_, _>>()?,
        Values::Text(v) => match v.first() {
            None => Vec::new(),
            Some(first) => return Err(decode_error(first.clone().unwrap_or_default())),
        },
    };
    offsets
        .into_iter()
        .map(|offset| {
            epoch
                .instant(offset)
                .map_err(|_| decode_error(offset.to_string()))
        })
        .collect()
}
