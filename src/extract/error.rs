use crate::container::ContainerError;
use crate::geoparquet::WriterError;
use crate::record::RecordKind;
use crate::units::UnitError;

/// Errors that abort the extraction of a record table
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Error while decoding container values
    #[error("Container error: {0}")]
    ContainerError(#[from] ContainerError),

    /// Error while writing a record table
    #[error("Writer error: {0}")]
    WriterError(#[from] WriterError),

    /// A required variable is absent and not covered by an optional prefix
    #[error("Required variable not found: {0}")]
    MissingVariable(String),

    /// Latitude and longitude arrays of a kind have different lengths
    #[error("Coordinate arrays of {kind} disagree: {lat} latitudes, {lon} longitudes")]
    CoordinateLengthMismatch {
        /// Record kind being extracted
        kind: RecordKind,
        /// Length of `<kind>_lat`
        lat: usize,
        /// Length of `<kind>_lon`
        lon: usize,
    },

    /// Declared row count differs from the coordinate arrays (strict mode)
    #[error("{kind} count declares {declared} rows but coordinate arrays hold {actual}")]
    CountMismatch {
        /// Record kind being extracted
        kind: RecordKind,
        /// Value of `<kind>_count`
        declared: usize,
        /// Length of the coordinate arrays
        actual: usize,
    },

    /// A field variable does not have one value per row
    #[error("Variable {variable} holds {actual} values, expected {expected}")]
    FieldLengthMismatch {
        /// Offending variable
        variable: String,
        /// Row count of the table
        expected: usize,
        /// Number of values in the variable
        actual: usize,
    },

    /// A temporal offset value cannot be turned into a timestamp
    #[error("Cannot convert offset {value} of variable {variable} to a timestamp")]
    TemporalDecode {
        /// Offset variable
        variable: String,
        /// Offending raw value
        value: String,
    },

    /// The epoch of an offset unit cannot be parsed
    #[error("Invalid epoch unit on variable {variable}: {source}")]
    InvalidEpoch {
        /// Offset variable
        variable: String,
        /// Underlying parse failure
        source: UnitError,
    },
}
