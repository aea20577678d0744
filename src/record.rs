//! The three GLM record kinds and their fixed field lists.

use std::fmt;
use std::str::FromStr;

/// Coordinate fields shared by every record kind
pub const COORDINATE_FIELDS: [&str; 2] = ["lat", "lon"];

/// Field-name prefixes whose variables are missing from older file revisions
pub const OPTIONAL_FIELD_PREFIXES: [&str; 1] = ["frame_time_offset"];

/// One of the hierarchical lightning detection granularities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    /// Single optical pulse detected by one pixel
    Event,
    /// Adjacent events within one integration frame
    Group,
    /// Groups related in space and time
    Flash,
}

impl RecordKind {
    /// All kinds, in output order
    pub const ALL: [RecordKind; 3] = [RecordKind::Event, RecordKind::Group, RecordKind::Flash];

    /// Variable-name prefix (`event`, `group`, `flash`)
    pub fn prefix(&self) -> &'static str {
        match self {
            RecordKind::Event => "event",
            RecordKind::Group => "group",
            RecordKind::Flash => "flash",
        }
    }

    /// Plural form used for output files and asset keys
    pub fn plural(&self) -> &'static str {
        match self {
            RecordKind::Event => "events",
            RecordKind::Group => "groups",
            RecordKind::Flash => "flashes",
        }
    }

    /// Ordered field list, coordinates first
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Event => &["lat", "lon", "id", "time_offset", "energy", "parent_group_id"],
            RecordKind::Group => &[
                "lat",
                "lon",
                "id",
                "time_offset",
                "frame_time_offset",
                "area",
                "energy",
                "quality_flag",
                "parent_flash_id",
            ],
            RecordKind::Flash => &[
                "lat",
                "lon",
                "id",
                "time_offset_of_first_event",
                "time_offset_of_last_event",
                "frame_time_offset_of_first_event",
                "frame_time_offset_of_last_event",
                "area",
                "energy",
                "quality_flag",
            ],
        }
    }

    /// Source variable for a field: `<kind>_<field>`
    pub fn variable_name(&self, field: &str) -> String {
        format!("{}_{}", self.prefix(), field)
    }

    /// Declared row-count variable: `<kind>_count`
    pub fn count_variable(&self) -> String {
        self.variable_name("count")
    }

    /// Output file name within the destination directory
    pub fn file_name(&self) -> String {
        format!("{}.parquet", self.plural())
    }

    /// Asset key in catalog metadata
    pub fn asset_key(&self) -> String {
        format!("geoparquet_{}", self.plural())
    }

    /// Asset title in catalog metadata
    pub fn asset_title(&self) -> String {
        format!("Processed GeoParquet file for {}", self.plural())
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" | "events" => Ok(RecordKind::Event),
            "group" | "groups" => Ok(RecordKind::Group),
            "flash" | "flashes" => Ok(RecordKind::Flash),
            other => Err(format!("Unknown record kind: {}", other)),
        }
    }
}

/// Whether a field may be absent from the container without failing extraction
pub fn is_optional_field(field: &str) -> bool {
    OPTIONAL_FIELD_PREFIXES
        .iter()
        .any(|prefix| field.starts_with(prefix))
}

/// Whether a field is a coordinate consumed by the geometry column
pub fn is_coordinate_field(field: &str) -> bool {
    COORDINATE_FIELDS.contains(&field)
}
