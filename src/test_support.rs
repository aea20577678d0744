//! Synthetic GLM L2 datasets for unit tests.

use crate::container::{ArrayData, Dataset, Variable};

pub const EPOCH_UNIT: &str = "seconds since 2020-12-31 23:59:40.000";

fn scalar_i32(name: &str, value: i32) -> Variable {
    Variable::scalar(name, ArrayData::Int32(vec![value]))
}

fn scalar_f32(name: &str, value: f32) -> Variable {
    Variable::scalar(name, ArrayData::Float32(vec![value]))
}

fn coords(kind: &str, dim: &str, lat: Vec<f32>, lon: Vec<f32>) -> [Variable; 2] {
    [
        Variable::new(format!("{kind}_lat"), dim, ArrayData::Float32(lat))
            .with_attribute("long_name", "latitude")
            .with_attribute("units", "degrees_north"),
        Variable::new(format!("{kind}_lon"), dim, ArrayData::Float32(lon))
            .with_attribute("long_name", "longitude")
            .with_attribute("units", "degrees_east"),
    ]
}

/// Offsets stored as packed int16, the way GLM files store them
pub fn offset_variable(name: &str, dim: &str, raw: Vec<i16>) -> Variable {
    Variable::new(name, dim, ArrayData::Int16(raw))
        .with_attribute("long_name", "time offset")
        .with_attribute("units", EPOCH_UNIT)
        .with_attribute("scale_factor", 1.0)
        .with_attribute("add_offset", 0.0)
        .with_attribute("_Unsigned", "true")
}

fn energy(name: &str, dim: &str, values: Vec<f32>) -> Variable {
    Variable::new(name, dim, ArrayData::Float32(values))
        .with_attribute("long_name", "radiant energy")
        .with_attribute("units", "J")
}

fn ids(name: &str, dim: &str, values: Vec<i32>) -> Variable {
    Variable::new(name, dim, ArrayData::Int32(values)).with_attribute("_Unsigned", "true")
}

/// A small but complete GLM file: 3 events, 2 groups and 1 flash
pub fn glm_dataset() -> Dataset {
    let mut dataset = Dataset::new()
        .with_attribute(
            "dataset_name",
            "OR_GLM-L2-LCFA_G16_s20203662359400_e20210010000000_c20210010000026.nc",
        )
        .with_attribute("time_coverage_start", "2020-12-31T23:59:40.0Z")
        .with_attribute("time_coverage_end", "2021-01-01T00:00:00.0Z")
        .with_attribute("date_created", "2021-01-01T00:00:02.6Z")
        .with_attribute("platform_ID", "G16")
        .with_attribute("orbital_slot", "GOES-East")
        .with_attribute("instrument_ID", "FM1")
        .with_attribute("production_site", "WCDAS")
        .with_attribute("featureType", "point");

    let events = "number_of_events";
    let groups = "number_of_groups";
    let flashes = "number_of_flashes";

    let mut variables = vec![
        scalar_i32("event_count", 3),
        ids("event_id", events, vec![1, 2, 3]),
        offset_variable("event_time_offset", events, vec![0, 1, 60]),
        energy("event_energy", events, vec![1.0e-15, 2.0e-15, 3.0e-15]),
        ids("event_parent_group_id", events, vec![10, 10, 11]),
        scalar_i32("group_count", 2),
        ids("group_id", groups, vec![10, 11]),
        offset_variable("group_time_offset", groups, vec![0, 60]),
        offset_variable("group_frame_time_offset", groups, vec![0, 60]),
        Variable::new("group_area", groups, ArrayData::Float32(vec![70.0, 140.0]))
            .with_attribute("units", "km2"),
        energy("group_energy", groups, vec![3.0e-15, 3.0e-15]),
        Variable::new("group_quality_flag", groups, ArrayData::Int16(vec![0, 0]))
            .with_attribute("units", "1"),
        ids("group_parent_flash_id", groups, vec![100, 100]),
        scalar_i32("flash_count", 1),
        ids("flash_id", flashes, vec![100]),
        offset_variable("flash_time_offset_of_first_event", flashes, vec![0]),
        offset_variable("flash_time_offset_of_last_event", flashes, vec![60]),
        offset_variable("flash_frame_time_offset_of_first_event", flashes, vec![0]),
        offset_variable("flash_frame_time_offset_of_last_event", flashes, vec![60]),
        Variable::new("flash_area", flashes, ArrayData::Float32(vec![140.0]))
            .with_attribute("units", "km2"),
        energy("flash_energy", flashes, vec![6.0e-15]),
        Variable::new("flash_quality_flag", flashes, ArrayData::Int16(vec![0]))
            .with_attribute("units", "1"),
        Variable::scalar("product_time", ArrayData::Float64(vec![662_731_180.0])),
        scalar_f32("lat_field_of_view", 0.0),
        scalar_f32("lon_field_of_view", -75.0),
        scalar_i32("yaw_flip_flag", 0),
        scalar_f32("nominal_satellite_subpoint_lat", 0.0),
        scalar_f32("percent_uncorrectable_L0_errors", 0.0),
        Variable::scalar("group_time_threshold", ArrayData::Float32(vec![0.0])),
    ];
    variables.extend(coords("event", events, vec![10.0, 11.0, 12.0], vec![-70.0, -71.0, -72.0]));
    variables.extend(coords("group", groups, vec![10.5, 12.0], vec![-70.5, -72.0]));
    variables.extend(coords("flash", flashes, vec![11.0], vec![-71.0]));

    for variable in variables {
        dataset.insert_variable(variable);
    }
    dataset
}
