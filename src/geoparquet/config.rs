use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties, WriterVersion};
use parquet::format::KeyValue;
use parquet::schema::types::ColumnPath;

use crate::asset::GEOMETRY_COLUMN;

/// Compression options for the record tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// ZSTD compression at the given level (1-22)
    Zstd(i32),
    /// Snappy compression (faster, slightly larger files)
    Snappy,
    /// No compression
    Uncompressed,
}

impl Default for CompressionType {
    fn default() -> Self {
        Self::Zstd(3)
    }
}

/// Configuration for the GeoParquet writer
#[derive(Debug, Clone, PartialEq)]
pub struct WriterConfig {
    /// Compression type to use
    pub compression: CompressionType,

    /// Maximum rows per row group
    pub row_group_size: usize,

    /// Data page size in bytes
    pub data_page_size: usize,

    /// Whether to write column statistics
    pub write_statistics: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: CompressionType::default(),
            // A GLM file rarely holds more than a few thousand events
            row_group_size: 100_000,
            data_page_size: 1024 * 1024,
            write_statistics: true,
        }
    }
}

impl WriterConfig {
    /// Create writer properties carrying the given footer metadata
    pub(super) fn to_writer_properties(&self, metadata: &[(String, String)]) -> WriterProperties {
        let compression = match self.compression {
            CompressionType::Zstd(level) => {
                Compression::ZSTD(ZstdLevel::try_new(level).unwrap_or_default())
            }
            CompressionType::Snappy => Compression::SNAPPY,
            CompressionType::Uncompressed => Compression::UNCOMPRESSED,
        };

        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        let kv_metadata: Vec<KeyValue> = metadata
            .iter()
            .map(|(k, v)| KeyValue {
                key: k.clone(),
                value: Some(v.clone()),
            })
            .collect();

        WriterProperties::builder()
            .set_writer_version(WriterVersion::PARQUET_2_0)
            .set_compression(compression)
            .set_data_page_size_limit(self.data_page_size)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(self.row_group_size)
            // WKB blobs are unique per row
            .set_column_dictionary_enabled(ColumnPath::new(vec![GEOMETRY_COLUMN.to_string()]), false)
            .set_key_value_metadata(Some(kv_metadata))
            .build()
    }
}
