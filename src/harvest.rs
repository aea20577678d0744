//! # Scalar-Property Harvester
//!
//! Turns the zero-dimensional variables of a GLM file into namespaced catalog
//! properties. Each variable name is classified by the first matching entry
//! of [`RULES`]; the classification decides whether the value becomes a
//! centroid component, a conditionally included property, or an
//! unconditionally included property.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::container::{ContainerError, Dataset, Scalar};

/// Namespace of harvested property keys
pub const PROPERTY_PREFIX: &str = "goes:";
/// Scalar variables never harvested
pub const EXCLUDED_VARIABLES: [&str; 1] = ["product_time"];
/// Fill sentinel of the nominal and percent variables
pub const FILL_SENTINEL: f64 = -999.0;
/// Absolute tolerance when comparing against [`FILL_SENTINEL`]
pub const SENTINEL_TOLERANCE: f64 = 1e-6;

/// What to do with a scalar variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Latitude component of the projection centroid
    CentroidLat,
    /// Longitude component of the projection centroid
    CentroidLon,
    /// Property included only when the value is `>= 0`
    NonNegative,
    /// Property included only when the value is not the fill sentinel
    NotSentinel,
    /// Property included unconditionally
    Always,
}

/// A `(predicate, classification)` pair of the rule table
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Short rule description, used in logs
    pub name: &'static str,
    /// Predicate on the variable name
    pub matches: fn(&str) -> bool,
    /// Classification applied when the predicate holds
    pub classification: Classification,
}

/// Classification rules, evaluated in order; the first match wins
pub const RULES: &[Rule] = &[
    Rule {
        name: "latitude of view",
        matches: |name| name == "lat_field_of_view",
        classification: Classification::CentroidLat,
    },
    Rule {
        name: "longitude of view",
        matches: |name| name == "lon_field_of_view",
        classification: Classification::CentroidLon,
    },
    Rule {
        name: "count or yaw flip",
        matches: |name| name.ends_with("_count") || name == "yaw_flip_flag",
        classification: Classification::NonNegative,
    },
    Rule {
        name: "nominal or percent",
        matches: |name| name.starts_with("nominal_") || name.starts_with("percent_"),
        classification: Classification::NotSentinel,
    },
    Rule {
        name: "default",
        matches: |_| true,
        classification: Classification::Always,
    },
];

/// Classify a scalar variable by name
pub fn classify(name: &str) -> Classification {
    RULES
        .iter()
        .find(|rule| (rule.matches)(name))
        .map(|rule| rule.classification)
        .unwrap_or(Classification::Always)
}

/// Projection centroid taken from the field-of-view variables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

/// Harvested properties of one container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarProperties {
    /// Namespaced property values
    pub properties: BTreeMap<String, Value>,
    /// Centroid, when both components were found
    pub centroid: Option<Centroid>,
}

/// Harvest all scalar variables of a dataset
pub fn harvest(dataset: &Dataset) -> Result<ScalarProperties, ContainerError> {
    let mut harvested = ScalarProperties::default();
    let mut lat = None;
    let mut lon = None;

    for variable in dataset.variables.iter().filter(|v| v.is_scalar()) {
        if EXCLUDED_VARIABLES.contains(&variable.name.as_str()) {
            continue;
        }
        // Masked scalars carry no value
        let Some(value) = variable.scalar_value()? else {
            continue;
        };

        let key = format!("{}{}", PROPERTY_PREFIX, variable.name);
        match classify(&variable.name) {
            Classification::CentroidLat => lat = value.as_f64(),
            Classification::CentroidLon => lon = value.as_f64(),
            Classification::NonNegative => {
                if value.as_f64().is_some_and(|v| v >= 0.0) {
                    insert(&mut harvested.properties, key, value);
                } else {
                    debug!("Dropping negative {}", variable.name);
                }
            }
            Classification::NotSentinel => {
                if value.as_f64().is_some_and(|v| !is_fill_sentinel(v)) {
                    insert(&mut harvested.properties, key, value);
                } else {
                    debug!("Dropping fill value of {}", variable.name);
                }
            }
            Classification::Always => insert(&mut harvested.properties, key, value),
        }
    }

    if let (Some(lat), Some(lon)) = (lat, lon) {
        harvested.centroid = Some(Centroid { lat, lon });
    }
    Ok(harvested)
}

/// Whether a value is numerically close to [`FILL_SENTINEL`]
pub fn is_fill_sentinel(value: f64) -> bool {
    (value - FILL_SENTINEL).abs() <= SENTINEL_TOLERANCE
}

fn insert(properties: &mut BTreeMap<String, Value>, key: String, value: Scalar) {
    let json = match value {
        Scalar::Int(v) => Value::from(v),
        Scalar::Float(v) => match serde_json::Number::from_f64(v) {
            Some(n) => Value::Number(n),
            None => {
                debug!("Dropping non-finite {}", key);
                return;
            }
        },
        Scalar::Text(v) => Value::from(v),
    };
    properties.insert(key, json);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ArrayData, Variable};
    use crate::test_support::glm_dataset;
    use proptest::prelude::*;
    use serde_json::json;

    fn with_scalar(name: &str, value: f32) -> Dataset {
        Dataset::new().with_variable(Variable::scalar(name, ArrayData::Float32(vec![value])))
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(classify("lat_field_of_view"), Classification::CentroidLat);
        assert_eq!(classify("lon_field_of_view"), Classification::CentroidLon);
        assert_eq!(classify("event_count"), Classification::NonNegative);
        assert_eq!(classify("yaw_flip_flag"), Classification::NonNegative);
        // Count suffix is checked before the percent prefix
        assert_eq!(classify("percent_count"), Classification::NonNegative);
        assert_eq!(classify("nominal_satellite_height"), Classification::NotSentinel);
        assert_eq!(classify("percent_navigated_L1b_events"), Classification::NotSentinel);
        assert_eq!(classify("group_time_threshold"), Classification::Always);
        assert_eq!(RULES.last().map(|r| r.classification), Some(Classification::Always));
    }

    #[test]
    fn test_harvest_glm_scalars() {
        let harvested = harvest(&glm_dataset()).unwrap();

        assert_eq!(harvested.centroid, Some(Centroid { lat: 0.0, lon: -75.0 }));
        assert_eq!(harvested.properties["goes:event_count"], json!(3));
        assert_eq!(harvested.properties["goes:yaw_flip_flag"], json!(0));
        assert_eq!(harvested.properties["goes:group_time_threshold"], json!(0.0));
        assert!(!harvested.properties.contains_key("goes:product_time"));
        assert!(!harvested.properties.contains_key("goes:lat_field_of_view"));
        // Arrays are never harvested
        assert!(!harvested.properties.contains_key("goes:event_energy"));
    }

    #[test]
    fn test_sentinel_suppression() {
        let exact = harvest(&with_scalar("nominal_satellite_height", -999.0)).unwrap();
        assert!(exact.properties.is_empty());

        let near = harvest(&with_scalar("nominal_satellite_height", -998.9)).unwrap();
        assert!(near.properties.contains_key("goes:nominal_satellite_height"));
    }

    #[test]
    fn test_negative_counts_are_dropped() {
        let dataset = Dataset::new()
            .with_variable(Variable::scalar("flash_count", ArrayData::Int32(vec![-1])))
            .with_variable(Variable::scalar("yaw_flip_flag", ArrayData::Int8(vec![-1])));
        assert!(harvest(&dataset).unwrap().properties.is_empty());
    }

    #[test]
    fn test_partial_centroid_is_dropped() {
        let harvested = harvest(&with_scalar("lat_field_of_view", 10.0)).unwrap();
        assert_eq!(harvested.centroid, None);
        assert!(harvested.properties.is_empty());
    }

    #[test]
    fn test_non_finite_scalars_are_dropped() {
        let dataset = Dataset::new()
            .with_variable(Variable::scalar("group_time_threshold", ArrayData::Float32(vec![f32::NAN])))
            .with_variable(Variable::scalar("flash_time_threshold", ArrayData::Float64(vec![f64::INFINITY])))
            .with_variable(Variable::scalar("event_time_threshold", ArrayData::Float32(vec![1.5])));
        let harvested = harvest(&dataset).unwrap();
        assert_eq!(harvested.properties.len(), 1);
        assert_eq!(harvested.properties["goes:event_time_threshold"], json!(1.5));
    }

    #[test]
    fn test_masked_scalar_is_skipped() {
        let dataset = Dataset::new().with_variable(
            Variable::scalar("group_time_threshold", ArrayData::Float32(vec![-1.0]))
                .with_attribute("_FillValue", -1.0),
        );
        assert!(harvest(&dataset).unwrap().properties.is_empty());
    }

    proptest! {
        #[test]
        fn prop_sentinel_tolerance(value in -2000.0f64..2000.0) {
            let included = !is_fill_sentinel(value);
            prop_assert_eq!(included, (value + 999.0).abs() > SENTINEL_TOLERANCE);
        }
    }
}
