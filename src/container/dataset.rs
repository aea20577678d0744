use std::collections::BTreeMap;
use std::fmt;

use super::ContainerError;

/// Attribute carrying the signedness flag for integer storage
pub const UNSIGNED_ATTRIBUTE: &str = "_Unsigned";
/// Attribute carrying the fill value of a variable
pub const FILL_VALUE_ATTRIBUTE: &str = "_FillValue";
/// Alternative fill marker used by some producers
pub const MISSING_VALUE_ATTRIBUTE: &str = "missing_value";
/// Packing multiplier
pub const SCALE_FACTOR_ATTRIBUTE: &str = "scale_factor";
/// Packing offset
pub const ADD_OFFSET_ATTRIBUTE: &str = "add_offset";
/// Human-readable variable description
pub const LONG_NAME_ATTRIBUTE: &str = "long_name";
/// Unit string of a variable
pub const UNITS_ATTRIBUTE: &str = "units";

/// A single attribute value attached to a variable or to the container
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Text attribute
    Text(String),
    /// Signed integer attribute (all integer widths are widened)
    Int(i64),
    /// Unsigned 64-bit attribute that does not fit an `i64`
    UInt(u64),
    /// Floating point attribute
    Float(f64),
    /// Integer list attribute
    Ints(Vec<i64>),
    /// Floating point list attribute
    Floats(Vec<f64>),
    /// Text list attribute
    Texts(Vec<String>),
}

impl AttrValue {
    /// Text content, if this is a text attribute
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// First numeric value as `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::UInt(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            AttrValue::Ints(v) => v.first().map(|x| *x as f64),
            AttrValue::Floats(v) => v.first().copied(),
            AttrValue::Text(_) | AttrValue::Texts(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => write!(f, "{}", s),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::UInt(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Ints(v) => write!(f, "{:?}", v),
            AttrValue::Floats(v) => write!(f, "{:?}", v),
            AttrValue::Texts(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

/// A named dimension of the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    /// Dimension name
    pub name: String,
    /// Current length
    pub len: usize,
}

impl Dimension {
    /// Create a new dimension
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            len,
        }
    }
}

/// Storage type of a variable
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Char,
    String,
}

impl DataType {
    /// Storage type name as reported in column descriptors
    pub fn label(&self) -> &'static str {
        match self {
            DataType::Int8 => "int8",
            DataType::UInt8 => "uint8",
            DataType::Int16 => "int16",
            DataType::UInt16 => "uint16",
            DataType::Int32 => "int32",
            DataType::UInt32 => "uint32",
            DataType::Int64 => "int64",
            DataType::UInt64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Char => "S1",
            DataType::String => "str",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw (undecoded) values of a variable, in storage order
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    /// Character array, already joined into one string
    Char(String),
    String(Vec<String>),
}

impl ArrayData {
    /// Storage type of these values
    pub fn data_type(&self) -> DataType {
        match self {
            ArrayData::Int8(_) => DataType::Int8,
            ArrayData::UInt8(_) => DataType::UInt8,
            ArrayData::Int16(_) => DataType::Int16,
            ArrayData::UInt16(_) => DataType::UInt16,
            ArrayData::Int32(_) => DataType::Int32,
            ArrayData::UInt32(_) => DataType::UInt32,
            ArrayData::Int64(_) => DataType::Int64,
            ArrayData::UInt64(_) => DataType::UInt64,
            ArrayData::Float32(_) => DataType::Float32,
            ArrayData::Float64(_) => DataType::Float64,
            ArrayData::Char(_) => DataType::Char,
            ArrayData::String(_) => DataType::String,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Int8(v) => v.len(),
            ArrayData::UInt8(v) => v.len(),
            ArrayData::Int16(v) => v.len(),
            ArrayData::UInt16(v) => v.len(),
            ArrayData::Int32(v) => v.len(),
            ArrayData::UInt32(v) => v.len(),
            ArrayData::Int64(v) => v.len(),
            ArrayData::UInt64(v) => v.len(),
            ArrayData::Float32(v) => v.len(),
            ArrayData::Float64(v) => v.len(),
            ArrayData::Char(_) => 1,
            ArrayData::String(v) => v.len(),
        }
    }

    /// Whether the array holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Integer elements widened to `i128`, honouring the unsigned reinterpretation flag.
    ///
    /// Returns `None` for floating point and text storage.
    fn integers(&self, as_unsigned: bool) -> Option<Vec<i128>> {
        let values = match self {
            ArrayData::Int8(v) if as_unsigned => v.iter().map(|x| *x as u8 as i128).collect(),
            ArrayData::Int8(v) => v.iter().map(|x| *x as i128).collect(),
            ArrayData::Int16(v) if as_unsigned => v.iter().map(|x| *x as u16 as i128).collect(),
            ArrayData::Int16(v) => v.iter().map(|x| *x as i128).collect(),
            ArrayData::Int32(v) if as_unsigned => v.iter().map(|x| *x as u32 as i128).collect(),
            ArrayData::Int32(v) => v.iter().map(|x| *x as i128).collect(),
            ArrayData::Int64(v) if as_unsigned => v.iter().map(|x| *x as u64 as i128).collect(),
            ArrayData::Int64(v) => v.iter().map(|x| *x as i128).collect(),
            ArrayData::UInt8(v) => v.iter().map(|x| *x as i128).collect(),
            ArrayData::UInt16(v) => v.iter().map(|x| *x as i128).collect(),
            ArrayData::UInt32(v) => v.iter().map(|x| *x as i128).collect(),
            ArrayData::UInt64(v) => v.iter().map(|x| *x as i128).collect(),
            _ => return None,
        };
        Some(values)
    }
}

/// Decoded values of a variable: unsigned flag applied, fill values masked
/// (as `None`) and packing undone.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// Integer values (no packing attributes present)
    Int(Vec<Option<i64>>),
    /// Floating point values, either stored as floats or unpacked
    Float(Vec<Option<f64>>),
    /// Text values
    Text(Vec<Option<String>>),
}

impl Values {
    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Values::Int(v) => v.len(),
            Values::Float(v) => v.len(),
            Values::Text(v) => v.len(),
        }
    }

    /// Whether there are no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values as `f64`, masked entries as `None`. Text yields `None` throughout.
    pub fn to_f64(&self) -> Vec<Option<f64>> {
        match self {
            Values::Int(v) => v.iter().map(|x| x.map(|x| x as f64)).collect(),
            Values::Float(v) => v.clone(),
            Values::Text(v) => vec![None; v.len()],
        }
    }
}

/// A single unmasked scalar value
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric value, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Text(_) => None,
        }
    }
}

/// A named variable: storage values plus dimensions and attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable name
    pub name: String,
    /// Dimensions in storage order; empty for scalars
    pub dimensions: Vec<Dimension>,
    /// Variable attributes
    pub attributes: BTreeMap<String, AttrValue>,
    /// Raw storage values
    pub data: ArrayData,
}

impl Variable {
    /// Create a one-dimensional variable whose dimension length matches the data
    pub fn new(name: impl Into<String>, dimension: impl Into<String>, data: ArrayData) -> Self {
        let len = data.len();
        Self {
            name: name.into(),
            dimensions: vec![Dimension::new(dimension, len)],
            attributes: BTreeMap::new(),
            data,
        }
    }

    /// Create a zero-dimensional variable
    pub fn scalar(name: impl Into<String>, data: ArrayData) -> Self {
        Self {
            name: name.into(),
            dimensions: Vec::new(),
            attributes: BTreeMap::new(),
            data,
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Storage type
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Whether this variable has no dimensions
    pub fn is_scalar(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Attribute lookup
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Text attribute lookup
    pub fn text_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(AttrValue::as_text)
    }

    fn is_unsigned(&self) -> bool {
        self.text_attribute(UNSIGNED_ATTRIBUTE)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Fill markers, reinterpreted like the data when the unsigned flag is set
    fn fill_values(&self, as_unsigned: bool) -> Vec<f64> {
        [FILL_VALUE_ATTRIBUTE, MISSING_VALUE_ATTRIBUTE]
            .iter()
            .filter_map(|name| self.attribute(name).and_then(AttrValue::as_f64))
            .map(|fill| {
                if !as_unsigned || fill >= 0.0 {
                    return fill;
                }
                let modulus = match self.data_type() {
                    DataType::Int8 => 256.0,
                    DataType::Int16 => 65_536.0,
                    DataType::Int32 => 4_294_967_296.0,
                    _ => return fill,
                };
                fill + modulus
            })
            .collect()
    }

    /// Decode the stored values.
    ///
    /// The unsigned flag is applied first, then fill values are masked on the
    /// stored representation, and finally `scale_factor`/`add_offset` unpack
    /// the remaining values into floats.
    pub fn values(&self) -> Result<Values, ContainerError> {
        let as_unsigned = self.is_unsigned();
        let fills = self.fill_values(as_unsigned);
        let scale = self.attribute(SCALE_FACTOR_ATTRIBUTE).and_then(AttrValue::as_f64);
        let offset = self.attribute(ADD_OFFSET_ATTRIBUTE).and_then(AttrValue::as_f64);
        let packed = scale.is_some() || offset.is_some();
        let is_fill = |v: f64| fills.iter().any(|f| *f == v);

        if let Some(ints) = self.data.integers(as_unsigned) {
            if packed {
                let scale = scale.unwrap_or(1.0);
                let offset = offset.unwrap_or(0.0);
                return Ok(Values::Float(
                    ints.into_iter()
                        .map(|raw| {
                            let raw = raw as f64;
                            (!is_fill(raw)).then(|| raw * scale + offset)
                        })
                        .collect(),
                ));
            }
            let mut out = Vec::with_capacity(ints.len());
            for raw in ints {
                if is_fill(raw as f64) {
                    out.push(None);
                    continue;
                }
                let value = i64::try_from(raw).map_err(|_| ContainerError::ValueOutOfRange {
                    variable: self.name.clone(),
                    value: raw.to_string(),
                })?;
                out.push(Some(value));
            }
            return Ok(Values::Int(out));
        }

        let floats: Vec<f64> = match &self.data {
            ArrayData::Float32(v) => v.iter().map(|x| *x as f64).collect(),
            ArrayData::Float64(v) => v.clone(),
            ArrayData::Char(s) => return Ok(Values::Text(vec![Some(s.clone())])),
            ArrayData::String(v) => return Ok(Values::Text(v.iter().cloned().map(Some).collect())),
            _ => {
                return Err(ContainerError::Unsupported(format!(
                    "{} storage for variable {}",
                    self.data_type(),
                    self.name
                )))
            }
        };
        let scale = scale.unwrap_or(1.0);
        let offset = offset.unwrap_or(0.0);
        Ok(Values::Float(
            floats
                .into_iter()
                .map(|raw| (!raw.is_nan() && !is_fill(raw)).then(|| raw * scale + offset))
                .collect(),
        ))
    }

    /// The single decoded value of a variable holding exactly one element.
    ///
    /// `None` when the variable holds more than one element or the element is masked.
    pub fn scalar_value(&self) -> Result<Option<Scalar>, ContainerError> {
        let values = self.values()?;
        if values.len() != 1 {
            return Ok(None);
        }
        let scalar = match values {
            Values::Int(mut v) => v.pop().flatten().map(Scalar::Int),
            Values::Float(mut v) => v.pop().flatten().map(Scalar::Float),
            Values::Text(mut v) => v.pop().flatten().map(Scalar::Text),
        };
        Ok(scalar)
    }
}

/// In-memory snapshot of a container: global attributes, dimensions and variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Global attributes
    pub attributes: BTreeMap<String, AttrValue>,
    /// Dimensions in definition order
    pub dimensions: Vec<Dimension>,
    /// Variables in definition order
    pub variables: Vec<Variable>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style global attribute setter
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder-style variable insertion; registers unseen dimensions
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.insert_variable(variable);
        self
    }

    /// Insert or replace a variable, registering unseen dimensions
    pub fn insert_variable(&mut self, variable: Variable) {
        for dim in &variable.dimensions {
            if !self.dimensions.iter().any(|d| d.name == dim.name) {
                self.dimensions.push(dim.clone());
            }
        }
        match self.variables.iter_mut().find(|v| v.name == variable.name) {
            Some(existing) => *existing = variable,
            None => self.variables.push(variable),
        }
    }

    /// Variable lookup by name
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Mutable variable lookup by name
    pub fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.iter_mut().find(|v| v.name == name)
    }

    /// Global attribute lookup
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Global text attribute lookup
    pub fn text_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(AttrValue::as_text)
    }
}
