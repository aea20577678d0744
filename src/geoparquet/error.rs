/// Errors that can occur while writing or reading GeoParquet files
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the Arrow library during array operations
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Error from the Parquet library
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// Footer metadata could not be encoded or decoded
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid data provided to the writer
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A file lacks the footer metadata of a GeoParquet file
    #[error("Missing footer metadata key: {0}")]
    MissingMetadata(String),
}
