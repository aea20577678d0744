//! netCDF-4 backed container using the `netcdf` crate.
//!
//! The file is opened in append mode. Attribute additions go through the
//! high-level API immediately; attribute deletions are not exposed by that
//! API, so they are queued and applied through `netcdf-sys` once the
//! high-level handle has been closed.

use std::collections::BTreeMap;
use std::ffi::CString;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;

use super::{ArrayData, AttrValue, Container, ContainerError, Dataset, Dimension, Variable};

/// A netCDF file opened for reading and in-place attribute patching
pub struct NetCdfContainer {
    path: PathBuf,
    file: Option<netcdf::FileMut>,
    dataset: Dataset,
    pending_deletions: Vec<(String, String)>,
}

impl NetCdfContainer {
    /// Open a netCDF file in append mode and snapshot its contents
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ContainerError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File does not exist: {}", path.display()),
            )));
        }

        let file = netcdf::append(&path)?;
        let dataset = load_dataset(&file)?;
        debug!(
            "Opened {} ({} variables, {} global attributes)",
            path.display(),
            dataset.variables.len(),
            dataset.attributes.len()
        );

        Ok(Self {
            path,
            file: Some(file),
            dataset,
            pending_deletions: Vec::new(),
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the file and apply queued attribute deletions
    pub fn close(mut self) -> Result<(), ContainerError> {
        self.finish()
    }

    fn finish(&mut self) -> Result<(), ContainerError> {
        // Dropping the handle closes the file and flushes attribute writes
        drop(self.file.take());
        if self.pending_deletions.is_empty() {
            return Ok(());
        }
        let deletions = std::mem::take(&mut self.pending_deletions);
        delete_attributes(&self.path, &deletions)
    }
}

impl Drop for NetCdfContainer {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!("Failed to finalize {}: {}", self.path.display(), e);
        }
    }
}

impl Container for NetCdfContainer {
    fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn put_variable_attribute(
        &mut self,
        variable: &str,
        name: &str,
        value: AttrValue,
    ) -> Result<(), ContainerError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| ContainerError::Unsupported("container already closed".to_string()))?;
        let mut var = file
            .variable_mut(variable)
            .ok_or_else(|| ContainerError::MissingVariable(variable.to_string()))?;
        var.put_attribute(name, to_netcdf_value(&value))?;

        // A re-added attribute must not be removed again on close
        self.pending_deletions
            .retain(|(v, n)| !(v == variable && n == name));
        if let Some(var) = self.dataset.variable_mut(variable) {
            var.attributes.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn delete_variable_attribute(
        &mut self,
        variable: &str,
        name: &str,
    ) -> Result<(), ContainerError> {
        let var = self
            .dataset
            .variable_mut(variable)
            .ok_or_else(|| ContainerError::MissingVariable(variable.to_string()))?;
        if var.attributes.remove(name).is_some() {
            self.pending_deletions
                .push((variable.to_string(), name.to_string()));
        }
        Ok(())
    }
}

fn load_dataset(file: &netcdf::FileMut) -> Result<Dataset, ContainerError> {
    let mut dataset = Dataset::new();

    for attr in file.attributes() {
        let value = attr.value()?;
        if let Some(value) = from_netcdf_value(value) {
            dataset.attributes.insert(attr.name().to_string(), value);
        }
    }

    dataset.dimensions = file
        .dimensions()
        .map(|d| Dimension::new(d.name(), d.len()))
        .collect();

    for var in file.variables() {
        let name = var.name();
        let Some(data) = read_data(&var)? else {
            debug!("Skipping variable {} with unsupported storage type", name);
            continue;
        };

        let mut attributes = BTreeMap::new();
        for attr in var.attributes() {
            if let Some(value) = from_netcdf_value(attr.value()?) {
                attributes.insert(attr.name().to_string(), value);
            }
        }

        dataset.variables.push(Variable {
            name,
            dimensions: var
                .dimensions()
                .iter()
                .map(|d| Dimension::new(d.name(), d.len()))
                .collect(),
            attributes,
            data,
        });
    }

    Ok(dataset)
}

fn read_data(var: &netcdf::Variable) -> Result<Option<ArrayData>, ContainerError> {
    let data = match var.vartype() {
        NcVariableType::Int(IntType::I8) => ArrayData::Int8(var.get_values(..)?),
        NcVariableType::Int(IntType::U8) => ArrayData::UInt8(var.get_values(..)?),
        NcVariableType::Int(IntType::I16) => ArrayData::Int16(var.get_values(..)?),
        NcVariableType::Int(IntType::U16) => ArrayData::UInt16(var.get_values(..)?),
        NcVariableType::Int(IntType::I32) => ArrayData::Int32(var.get_values(..)?),
        NcVariableType::Int(IntType::U32) => ArrayData::UInt32(var.get_values(..)?),
        NcVariableType::Int(IntType::I64) => ArrayData::Int64(var.get_values(..)?),
        NcVariableType::Int(IntType::U64) => ArrayData::UInt64(var.get_values(..)?),
        NcVariableType::Float(FloatType::F32) => ArrayData::Float32(var.get_values(..)?),
        NcVariableType::Float(FloatType::F64) => ArrayData::Float64(var.get_values(..)?),
        NcVariableType::Char => {
            let bytes = var.get_raw_values(..)?;
            let text: String = String::from_utf8_lossy(&bytes)
                .trim_end_matches('\0')
                .to_string();
            ArrayData::Char(text)
        }
        NcVariableType::String if var.dimensions().is_empty() => {
            ArrayData::String(vec![var.get_string(..)?])
        }
        _ => return Ok(None),
    };
    Ok(Some(data))
}

fn from_netcdf_value(value: AttributeValue) -> Option<AttrValue> {
    let value = match value {
        AttributeValue::Str(s) => AttrValue::Text(s),
        AttributeValue::Strs(v) => AttrValue::Texts(v),
        AttributeValue::Schar(x) => AttrValue::Int(x.into()),
        AttributeValue::Uchar(x) => AttrValue::Int(x.into()),
        AttributeValue::Short(x) => AttrValue::Int(x.into()),
        AttributeValue::Ushort(x) => AttrValue::Int(x.into()),
        AttributeValue::Int(x) => AttrValue::Int(x.into()),
        AttributeValue::Uint(x) => AttrValue::Int(x.into()),
        AttributeValue::Longlong(x) => AttrValue::Int(x),
        AttributeValue::Ulonglong(x) => match i64::try_from(x) {
            Ok(x) => AttrValue::Int(x),
            Err(_) => AttrValue::UInt(x),
        },
        AttributeValue::Float(x) => AttrValue::Float(x.into()),
        AttributeValue::Double(x) => AttrValue::Float(x),
        AttributeValue::Schars(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Uchars(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Shorts(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Ushorts(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Ints(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Uints(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Longlongs(v) => AttrValue::Ints(v),
        AttributeValue::Ulonglongs(v) => {
            AttrValue::Ints(v.into_iter().filter_map(|x| i64::try_from(x).ok()).collect())
        }
        AttributeValue::Floats(v) => AttrValue::Floats(v.into_iter().map(f64::from).collect()),
        AttributeValue::Doubles(v) => AttrValue::Floats(v),
    };
    Some(value)
}

fn to_netcdf_value(value: &AttrValue) -> AttributeValue {
    match value {
        AttrValue::Text(s) => AttributeValue::Str(s.clone()),
        AttrValue::Int(x) => AttributeValue::Longlong(*x),
        AttrValue::UInt(x) => AttributeValue::Ulonglong(*x),
        AttrValue::Float(x) => AttributeValue::Double(*x),
        AttrValue::Ints(v) => AttributeValue::Longlongs(v.clone()),
        AttrValue::Floats(v) => AttributeValue::Doubles(v.clone()),
        AttrValue::Texts(v) => AttributeValue::Strs(v.clone()),
    }
}

fn check(code: std::os::raw::c_int) -> Result<(), ContainerError> {
    if code == netcdf_sys::NC_NOERR {
        Ok(())
    } else {
        Err(ContainerError::NetCdfError(netcdf::Error::Netcdf(code)))
    }
}

fn c_string(value: &str) -> Result<CString, ContainerError> {
    CString::new(value)
        .map_err(|_| ContainerError::Unsupported(format!("name contains NUL byte: {:?}", value)))
}

/// Remove variable attributes from a closed file through the C API
fn delete_attributes(path: &Path, deletions: &[(String, String)]) -> Result<(), ContainerError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| ContainerError::Unsupported(format!("non UTF-8 path: {}", path.display())))?;
    let c_path = c_string(path_str)?;

    let _guard = netcdf_sys::libnetcdf_lock.lock();
    let mut ncid = 0;
    // SAFETY: c_path is a valid NUL-terminated string and ncid is a valid out pointer.
    check(unsafe { netcdf_sys::nc_open(c_path.as_ptr(), netcdf_sys::NC_WRITE, &mut ncid) })?;

    let result = (|| {
        // SAFETY: ncid refers to the file opened above.
        check(unsafe { netcdf_sys::nc_redef(ncid) })?;
        for (variable, name) in deletions {
            let c_var = c_string(variable)?;
            let c_name = c_string(name)?;
            let mut varid = 0;
            // SAFETY: all pointers are valid for the duration of the calls.
            check(unsafe { netcdf_sys::nc_inq_varid(ncid, c_var.as_ptr(), &mut varid) })?;
            check(unsafe { netcdf_sys::nc_del_att(ncid, varid, c_name.as_ptr()) })?;
            debug!("Removed attribute {} from {}", name, variable);
        }
        // SAFETY: ncid is still open.
        check(unsafe { netcdf_sys::nc_enddef(ncid) })
    })();

    // SAFETY: ncid is closed exactly once.
    let closed = check(unsafe { netcdf_sys::nc_close(ncid) });
    result.and(closed)
}
