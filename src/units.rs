//! Unit-string handling for GLM variables.
//!
//! Epoch units follow the grammar
//!
//! ```text
//! ^(milli)?seconds since <instant>$
//! ```
//!
//! where `<instant>` is an ISO 8601 date or date-time. A `T` or a single
//! space may separate date and time, fractional seconds are optional, and an
//! explicit `Z` or numeric offset is normalised to UTC. Instants without a
//! zone are taken as UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Units that carry no information for catalog consumers
pub const IGNORED_UNITS: [&str; 2] = ["1", "count"];

static EPOCH_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<milli>milli)?seconds since (?P<instant>\S.*)$")
        .unwrap_or_else(|e| panic!("invalid epoch unit pattern: {e}"))
});

/// Errors raised while interpreting unit strings
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UnitError {
    /// The epoch part of a unit is not a recognised ISO instant
    #[error("Invalid epoch instant: {0:?}")]
    InvalidInstant(String),

    /// Offset cannot be represented as a timestamp
    #[error("Offset {0} is outside the representable time range")]
    OffsetOutOfRange(f64),
}

/// Tick size of an epoch offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochResolution {
    /// `seconds since ...`
    Seconds,
    /// `milliseconds since ...`
    Milliseconds,
}

impl EpochResolution {
    fn micros_per_tick(&self) -> f64 {
        match self {
            EpochResolution::Seconds => 1_000_000.0,
            EpochResolution::Milliseconds => 1_000.0,
        }
    }
}

/// A parsed `<resolution> since <epoch>` unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochUnit {
    /// Reference instant, in UTC
    pub epoch: DateTime<Utc>,
    /// Tick size of the offsets
    pub resolution: EpochResolution,
}

impl EpochUnit {
    /// Parse an epoch unit.
    ///
    /// Returns `Ok(None)` for units that do not follow the epoch grammar, and
    /// an error when they do but the instant cannot be parsed.
    pub fn parse(unit: &str) -> Result<Option<Self>, UnitError> {
        let Some(captures) = EPOCH_UNIT.captures(unit) else {
            return Ok(None);
        };
        let resolution = if captures.name("milli").is_some() {
            EpochResolution::Milliseconds
        } else {
            EpochResolution::Seconds
        };
        let instant = captures
            .name("instant")
            .map(|m| m.as_str())
            .unwrap_or_default();
        Ok(Some(Self {
            epoch: parse_instant(instant)?,
            resolution,
        }))
    }

    /// Timestamp `offset` ticks after the epoch, rounded to the microsecond
    pub fn instant(&self, offset: f64) -> Result<DateTime<Utc>, UnitError> {
        let micros = (offset * self.resolution.micros_per_tick()).round();
        if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
            return Err(UnitError::OffsetOutOfRange(offset));
        }
        self.epoch
            .checked_add_signed(Duration::microseconds(micros as i64))
            .ok_or(UnitError::OffsetOutOfRange(offset))
    }
}

/// Whether a unit string follows the epoch grammar (the instant is not validated)
pub fn is_epoch_unit(unit: &str) -> bool {
    EPOCH_UNIT.is_match(unit)
}

/// Parse an ISO 8601 instant into UTC
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>, UnitError> {
    let text = text.trim();
    let normalized = match (text.get(..10), text.get(10..11)) {
        (Some(date), Some(" ")) => format!("{}T{}", date, &text[11..]),
        _ => text.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(UnitError::InvalidInstant(text.to_string()))
}

/// Unit as reported in catalog column descriptors.
///
/// `percent` becomes `%`, dimensionless markers are dropped and everything
/// else (epoch units included) is kept verbatim.
pub fn catalog_unit(unit: &str) -> Option<String> {
    if unit == "percent" {
        Some("%".to_string())
    } else if IGNORED_UNITS.contains(&unit) {
        None
    } else {
        Some(unit.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn test_parse_seconds_unit() {
        let unit = EpochUnit::parse("seconds since 2020-01-01T00:00:00").unwrap().unwrap();
        assert_eq!(unit.resolution, EpochResolution::Seconds);
        assert_eq!(unit.epoch, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_milliseconds_unit_with_space_separator() {
        let unit = EpochUnit::parse("milliseconds since 2017-08-31 06:26:00.000")
            .unwrap()
            .unwrap();
        assert_eq!(unit.resolution, EpochResolution::Milliseconds);
        assert_eq!(unit.epoch, Utc.with_ymd_and_hms(2017, 8, 31, 6, 26, 0).unwrap());
        assert_eq!(
            unit.instant(1500.0).unwrap(),
            Utc.with_ymd_and_hms(2017, 8, 31, 6, 26, 1).unwrap() + Duration::milliseconds(500)
        );
    }

    #[test]
    fn test_offset_instant_is_normalised_to_utc() {
        let unit = EpochUnit::parse("seconds since 2020-01-01T02:00:00+02:00")
            .unwrap()
            .unwrap();
        assert_eq!(unit.epoch, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());

        let zulu = EpochUnit::parse("seconds since 2020-01-01T00:00:00Z").unwrap().unwrap();
        assert_eq!(zulu.epoch, unit.epoch);
    }

    #[test]
    fn test_bare_date() {
        let unit = EpochUnit::parse("seconds since 2000-01-01").unwrap().unwrap();
        assert_eq!(unit.epoch, Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_non_epoch_units() {
        for unit in ["m", "count", "Seconds since 2020-01-01", "seconds", "hours since 2020-01-01"] {
            assert_eq!(EpochUnit::parse(unit).unwrap(), None, "{unit}");
            assert!(!is_epoch_unit(unit));
        }
    }

    #[test]
    fn test_invalid_instant() {
        let err = EpochUnit::parse("seconds since yesterday").unwrap_err();
        assert_eq!(err, UnitError::InvalidInstant("yesterday".to_string()));
    }

    #[test]
    fn test_out_of_range_offset() {
        let unit = EpochUnit::parse("seconds since 2020-01-01").unwrap().unwrap();
        assert!(unit.instant(f64::NAN).is_err());
        assert!(unit.instant(1e300).is_err());
    }

    #[test]
    fn test_catalog_unit() {
        assert_eq!(catalog_unit("percent").as_deref(), Some("%"));
        assert_eq!(catalog_unit("1"), None);
        assert_eq!(catalog_unit("count"), None);
        assert_eq!(catalog_unit("km2").as_deref(), Some("km2"));
        assert_eq!(
            catalog_unit("seconds since 2020-01-01").as_deref(),
            Some("seconds since 2020-01-01")
        );
    }

    proptest! {
        #[test]
        fn prop_whole_second_offsets(offset in -1_000_000_000i64..1_000_000_000i64) {
            let unit = EpochUnit::parse("seconds since 2000-01-01T12:00:00").unwrap().unwrap();
            let instant = unit.instant(offset as f64).unwrap();
            prop_assert_eq!(instant - unit.epoch, Duration::seconds(offset));
        }
    }
}
