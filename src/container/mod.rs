//! # Container Module
//!
//! Access to self-describing scientific array containers (netCDF-4 for GLM
//! L2 files).
//!
//! A container is snapshotted into an in-memory [`Dataset`] when opened. All
//! extraction reads the snapshot; only attribute patches travel back to the
//! underlying file, through the [`Container`] trait.
//!
//! ## Decoding
//!
//! [`Variable::values`] applies the conventions the GLM producer relies on:
//!
//! 1. `_Unsigned = "true"` reinterprets signed integer storage as unsigned
//! 2. `_FillValue` / `missing_value` matches are masked
//! 3. `scale_factor` / `add_offset` unpack integers into floats
//!
//! ## Concurrency
//!
//! A container is exclusively owned by one extraction. Attribute patches
//! mutate the source file, so concurrent extractions of the same path must be
//! serialized by the caller.

mod dataset;
mod error;
mod memory;
#[cfg(feature = "netcdf")]
mod netcdf_file;


pub use dataset::{
    ArrayData, AttrValue, DataType, Dataset, Dimension, Scalar, Values, Variable,
    ADD_OFFSET_ATTRIBUTE, FILL_VALUE_ATTRIBUTE, LONG_NAME_ATTRIBUTE, MISSING_VALUE_ATTRIBUTE,
    SCALE_FACTOR_ATTRIBUTE, UNITS_ATTRIBUTE, UNSIGNED_ATTRIBUTE,
};
pub use error::ContainerError;
pub use memory::MemoryContainer;
#[cfg(feature = "netcdf")]
pub use netcdf_file::NetCdfContainer;

/// An open, mutate-capable container.
///
/// Reads go through the [`Dataset`] snapshot. Attribute mutations must be
/// reflected both in the snapshot and in the backing store.
pub trait Container {
    /// Snapshot of the container contents, including applied patches
    fn dataset(&self) -> &Dataset;

    /// Add or overwrite an attribute on a variable
    fn put_variable_attribute(
        &mut self,
        variable: &str,
        name: &str,
        value: AttrValue,
    ) -> Result<(), ContainerError>;

    /// Remove an attribute from a variable; removing an absent attribute is not an error
    fn delete_variable_attribute(&mut self, variable: &str, name: &str)
        -> Result<(), ContainerError>;
}
