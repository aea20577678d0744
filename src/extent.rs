//! # Spatial Extent Resolver
//!
//! Maps the orbital slot of a GOES satellite to the ground coverage of its
//! Geostationary Lightning Mapper.
//!
//! The West slot covers the antimeridian. Its bounding box keeps the
//! `west > east` convention of GeoJSON/STAC, while its polygon is split at
//! ±180° into two rings so that neither ring crosses the antimeridian.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Southern and northern coverage limit shared by all slots
const LAT_LIMIT: f64 = 66.56;

/// Assigned geostationary position of a GOES satellite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitalSlot {
    /// GOES-East, 75.2°W
    East,
    /// GOES-West, 137.2°W
    West,
    /// Checkout position, 89.5°W
    Test,
}

impl OrbitalSlot {
    /// All slots, in collection summary order
    pub const ALL: [OrbitalSlot; 3] = [OrbitalSlot::West, OrbitalSlot::East, OrbitalSlot::Test];

    /// Catalog value of the slot
    pub fn as_str(&self) -> &'static str {
        match self {
            OrbitalSlot::East => "East",
            OrbitalSlot::West => "West",
            OrbitalSlot::Test => "Test",
        }
    }

    /// Declared item bounding box
    pub fn bbox(&self) -> BoundingBox {
        match self {
            OrbitalSlot::West => BoundingBox::new(156.44, -LAT_LIMIT, -70.44, LAT_LIMIT),
            OrbitalSlot::East => BoundingBox::new(-141.56, -LAT_LIMIT, -8.44, LAT_LIMIT),
            OrbitalSlot::Test => BoundingBox::new(-156.06, -LAT_LIMIT, -22.94, LAT_LIMIT),
        }
    }

    /// Coverage polygon, one ring per side of the antimeridian
    pub fn geometry(&self) -> Geometry {
        Geometry::polygon(
            self.bbox()
                .split_antimeridian()
                .iter()
                .map(BoundingBox::ring)
                .collect(),
        )
    }

    /// Bounding box and geometry of the slot
    pub fn spatial_extent(&self) -> SpatialExtent {
        SpatialExtent {
            bbox: self.bbox(),
            geometry: self.geometry(),
        }
    }
}

impl fmt::Display for OrbitalSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrbitalSlot {
    type Err = String;

    /// Parse the `orbital_slot` attribute (`GOES-East`, `GOES_West`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "GOES_East" => Ok(OrbitalSlot::East),
            "GOES_West" => Ok(OrbitalSlot::West),
            "GOES_Test" => Ok(OrbitalSlot::Test),
            _ => Err(format!("Unknown orbital slot: {}", s)),
        }
    }
}

/// `[west, south, east, north]` in degrees; `west > east` crosses the antimeridian
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    /// Western longitude
    pub west: f64,
    /// Southern latitude
    pub south: f64,
    /// Eastern longitude
    pub east: f64,
    /// Northern latitude
    pub north: f64,
}

impl BoundingBox {
    /// Create a bounding box
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whether the box wraps across ±180°
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// The box itself, or its two halves on either side of the antimeridian
    pub fn split_antimeridian(&self) -> Vec<BoundingBox> {
        if self.crosses_antimeridian() {
            vec![
                BoundingBox::new(self.west, self.south, 180.0, self.north),
                BoundingBox::new(-180.0, self.south, self.east, self.north),
            ]
        } else {
            vec![*self]
        }
    }

    /// Closed ring starting at the north-west corner, running counter-clockwise
    pub fn ring(&self) -> Vec<[f64; 2]> {
        vec![
            [self.west, self.north],
            [self.west, self.south],
            [self.east, self.south],
            [self.east, self.north],
            [self.west, self.north],
        ]
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        BoundingBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.west, b.south, b.east, b.north]
    }
}

/// GeoJSON geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A polygon geometry
    Polygon {
        /// Linear rings of `[longitude, latitude]` pairs
        coordinates: Vec<Vec<[f64; 2]>>,
    },
}

impl Geometry {
    /// Create a polygon geometry
    pub fn polygon(coordinates: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry::Polygon { coordinates }
    }

    /// Rings of the geometry
    pub fn rings(&self) -> &[Vec<[f64; 2]>] {
        match self {
            Geometry::Polygon { coordinates } => coordinates,
        }
    }
}

/// Footprint of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    /// Item bounding box
    pub bbox: BoundingBox,
    /// Item geometry
    pub geometry: Geometry,
}

/// Extent for an `orbital_slot` attribute value; unknown values yield `None`
pub fn resolve_extent(orbital_slot: &str) -> Option<SpatialExtent> {
    orbital_slot
        .parse::<OrbitalSlot>()
        .ok()
        .map(|slot| slot.spatial_extent())
}

/// Collection-level boxes: the union of all slots, the West slot split at the
/// antimeridian, then East and Test
pub fn collection_bboxes() -> Vec<BoundingBox> {
    let west = OrbitalSlot::West.bbox();
    let east = OrbitalSlot::East.bbox();
    let union = BoundingBox::new(west.west, -LAT_LIMIT, east.east, LAT_LIMIT);

    let mut boxes = vec![union];
    boxes.extend(west.split_antimeridian());
    boxes.push(east);
    boxes.push(OrbitalSlot::Test.bbox());
    boxes
}
