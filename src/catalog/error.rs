use crate::container::ContainerError;
use crate::extract::ExtractError;
use crate::units::UnitError;

/// Errors that abort the creation of catalog metadata for a file
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Error while reading or patching the container
    #[error("Container error: {0}")]
    ContainerError(#[from] ContainerError),

    /// Error while extracting or writing a record table
    #[error("Extraction error: {0}")]
    ExtractError(#[from] ExtractError),

    /// A required global attribute is absent or not text
    #[error("Required global attribute not found: {0}")]
    MissingAttribute(String),

    /// `platform_ID` is not a known GOES-R platform
    #[error("The dataset contains an invalid platform identifier: {0}")]
    InvalidPlatform(String),

    /// `orbital_slot` is not a known orbital slot
    #[error("The value for 'orbital_slot' is invalid: {0}")]
    InvalidOrbitalSlot(String),

    /// A time coverage attribute is not an ISO instant
    #[error("Invalid datetime in attribute {attribute}: {source}")]
    InvalidDatetime {
        /// Attribute holding the value
        attribute: String,
        /// Underlying parse failure
        source: UnitError,
    },

    /// The container does not have the variable count of a known file revision (strict mode)
    #[error("The number of variables is expected to be 45 or 48, but it is {0}")]
    UnexpectedVariableCount(usize),
}
