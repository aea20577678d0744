/// Errors that can occur while reading or patching a scientific array container
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// I/O error while opening the container file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the netCDF library
    #[cfg(feature = "netcdf")]
    #[error("netCDF error: {0}")]
    NetCdfError(#[from] netcdf::Error),

    /// Named variable does not exist in the container
    #[error("Variable not found: {0}")]
    MissingVariable(String),

    /// Decoded value does not fit the target representation
    #[error("Value out of range in variable {variable}: {value}")]
    ValueOutOfRange {
        /// Variable that was being decoded
        variable: String,
        /// Offending raw value
        value: String,
    },

    /// Container uses a construct this reader does not understand
    #[error("Unsupported container content: {0}")]
    Unsupported(String),
}
