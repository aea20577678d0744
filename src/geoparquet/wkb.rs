//! Well-Known Binary encoding of point geometries.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use super::WriterError;
use crate::extract::Point;

/// WKB byte-order marker for little-endian (NDR) encoding
const LITTLE_ENDIAN: u8 = 1;
/// WKB geometry type code of a 2D point
const WKB_POINT: u32 = 1;
/// Encoded size of a 2D point
pub const POINT_SIZE: usize = 21;

/// Encode a point as little-endian WKB
pub fn encode_point(point: &Point) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(POINT_SIZE);
    buffer.push(LITTLE_ENDIAN);
    buffer.extend_from_slice(&WKB_POINT.to_le_bytes());
    buffer.extend_from_slice(&point.x.to_le_bytes());
    buffer.extend_from_slice(&point.y.to_le_bytes());
    buffer
}

/// Decode a little-endian WKB point
pub fn decode_point(bytes: &[u8]) -> Result<Point, WriterError> {
    let mut cursor = Cursor::new(bytes);
    let order = cursor.read_u8()?;
    if order != LITTLE_ENDIAN {
        return Err(WriterError::InvalidData(format!(
            "unsupported WKB byte order {}",
            order
        )));
    }
    let geometry_type = cursor.read_u32::<LittleEndian>()?;
    if geometry_type != WKB_POINT {
        return Err(WriterError::InvalidData(format!(
            "expected WKB point, found geometry type {}",
            geometry_type
        )));
    }
    let x = cursor.read_f64::<LittleEndian>()?;
    let y = cursor.read_f64::<LittleEndian>()?;
    Ok(Point { x, y })
}
