use std::fs::File;
use std::path::Path;

use arrow::array::{Array, BinaryArray};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::{FileReader, SerializedFileReader};

use super::{wkb, GeoMetadata, WriterError, COLUMNS_METADATA_KEY, GEO_METADATA_KEY};
use crate::asset::{FieldDescriptor, GEOMETRY_COLUMN};
use crate::extract::Point;

/// What a written GeoParquet file reports about itself
#[derive(Debug, Clone, PartialEq)]
pub struct GeoParquetSummary {
    /// Top-level column names in physical order
    pub column_names: Vec<String>,
    /// Number of rows according to the footer
    pub row_count: u64,
    /// Number of row groups
    pub row_groups: usize,
    /// Contents of the `geo` footer key
    pub geo: GeoMetadata,
    /// Column descriptors stored in the footer, when present
    pub columns: Option<Vec<FieldDescriptor>>,
}

impl GeoParquetSummary {
    /// Read the footer of a GeoParquet file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WriterError> {
        let reader = SerializedFileReader::new(File::open(path.as_ref())?)?;
        let metadata = reader.metadata();
        let file_metadata = metadata.file_metadata();

        let lookup = |key: &str| {
            file_metadata
                .key_value_metadata()
                .and_then(|kv| kv.iter().find(|entry| entry.key == key))
                .and_then(|entry| entry.value.clone())
        };

        let geo_json =
            lookup(GEO_METADATA_KEY).ok_or_else(|| WriterError::MissingMetadata(GEO_METADATA_KEY.to_string()))?;
        let geo: GeoMetadata = serde_json::from_str(&geo_json)?;
        let columns = lookup(COLUMNS_METADATA_KEY)
            .map(|json| serde_json::from_str::<Vec<FieldDescriptor>>(&json))
            .transpose()?;

        let root = file_metadata.schema_descr().root_schema();
        let column_names = root
            .get_fields()
            .iter()
            .map(|field| field.name().to_string())
            .collect();

        let row_count = u64::try_from(file_metadata.num_rows())
            .map_err(|_| WriterError::InvalidData("negative row count".to_string()))?;

        Ok(Self {
            column_names,
            row_count,
            row_groups: metadata.num_row_groups(),
            geo,
            columns,
        })
    }

    /// Name of the primary geometry column
    pub fn primary_geometry(&self) -> &str {
        &self.geo.primary_column
    }
}

/// Decode the geometry column of a GeoParquet file
pub fn read_geometry<P: AsRef<Path>>(path: P) -> Result<Vec<Point>, WriterError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path.as_ref())?)?;
    let reader = builder.build()?;

    let mut points = Vec::new();
    for batch in reader {
        let batch = batch?;
        let column = batch
            .column_by_name(GEOMETRY_COLUMN)
            .and_then(|c| c.as_any().downcast_ref::<BinaryArray>())
            .ok_or_else(|| {
                WriterError::InvalidData(format!("no binary {} column", GEOMETRY_COLUMN))
            })?;
        for i in 0..column.len() {
            points.push(wkb::decode_point(column.value(i))?);
        }
    }
    Ok(points)
}
