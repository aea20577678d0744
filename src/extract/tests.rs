use super::*;
use crate::container::{ArrayData, Dataset, Variable};
use crate::test_support::{glm_dataset, offset_variable};
use chrono::TimeZone;

fn timestamps_of<'a>(table: &'a RecordTable, name: &str) -> &'a [DateTime<Utc>] {
    match &table.column(name).unwrap().data {
        ColumnData::Timestamp(v) => v,
        other => panic!("{name} is not a timestamp column: {other:?}"),
    }
}

fn names(table: &RecordTable) -> Vec<String> {
    table.descriptors().into_iter().map(|d| d.name).collect()
}

fn flash_dataset(count: i32, lat: Vec<f32>, lon: Vec<f32>) -> Dataset {
    Dataset::new()
        .with_variable(Variable::scalar("flash_count", ArrayData::Int32(vec![count])))
        .with_variable(Variable::new("flash_lat", "lat_dim", ArrayData::Float32(lat)))
        .with_variable(Variable::new("flash_lon", "lon_dim", ArrayData::Float32(lon)))
}

#[test]
fn test_event_timestamps_from_seconds_offsets() {
    let dataset = Dataset::new()
        .with_variable(Variable::scalar("event_count", ArrayData::Int32(vec![5])))
        .with_variable(Variable::new(
            "event_lat",
            "number_of_events",
            ArrayData::Float32(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
        ))
        .with_variable(Variable::new(
            "event_lon",
            "number_of_events",
            ArrayData::Float32(vec![-1.0, -2.0, -3.0, -4.0, -5.0]),
        ))
        .with_variable(
            Variable::new(
                "event_time_offset",
                "number_of_events",
                ArrayData::Float64(vec![0.0, 1.0, 60.0, 120.0, 3600.0]),
            )
            .with_attribute("units", "seconds since 2020-01-01T00:00:00"),
        );

    let table = extract(
        &dataset,
        RecordKind::Event,
        &["lat", "lon", "time_offset"],
        CountPolicy::Lenient,
    )
    .unwrap();

    assert_eq!(table.row_count(), 5);
    assert_eq!(names(&table), ["geometry", "time", "time_offset"]);
    let times = timestamps_of(&table, "time");
    assert_eq!(times[0], Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(times[1], Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 1).unwrap());
    assert_eq!(times[2], Utc.with_ymd_and_hms(2020, 1, 1, 0, 1, 0).unwrap());

    let time = table.column("time").unwrap();
    assert_eq!(time.descriptor.data_type, DATETIME_TYPE);
    assert_eq!(time.descriptor.unit, None);
    let offset = table.column("time_offset").unwrap();
    assert_eq!(offset.descriptor.data_type, "float64");
    assert_eq!(
        offset.descriptor.unit.as_deref(),
        Some("seconds since 2020-01-01T00:00:00")
    );
}

#[test]
fn test_milliseconds_offsets() {
    let dataset = flash_dataset(2, vec![0.0, 0.0], vec![0.0, 0.0]).with_variable(
        Variable::new(
            "flash_time_offset_of_first_event",
            "lat_dim",
            ArrayData::Int32(vec![0, 1500]),
        )
        .with_attribute("units", "milliseconds since 2020-01-01"),
    );

    let table = extract(
        &dataset,
        RecordKind::Flash,
        &["time_offset_of_first_event"],
        CountPolicy::Strict,
    )
    .unwrap();
    let times = timestamps_of(&table, "time_of_first_event");
    assert_eq!(
        times[1],
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 1).unwrap() + chrono::Duration::milliseconds(500)
    );
}

#[test]
fn test_geometry_uses_lon_as_x() {
    let table = extract_kind(&glm_dataset(), RecordKind::Event, CountPolicy::Strict).unwrap();
    let lat = [10.0, 11.0, 12.0];
    let lon = [-70.0, -71.0, -72.0];
    for (i, point) in table.geometry.iter().enumerate() {
        assert_eq!(point.x, lon[i]);
        assert_eq!(point.y, lat[i]);
    }
    assert_eq!(table.crs, SOURCE_CRS);
    assert_eq!(table.geometry_descriptor, FieldDescriptor::new("geometry", "point"));
}

#[test]
fn test_all_columns_have_row_count_rows() {
    let dataset = glm_dataset();
    for kind in RecordKind::ALL {
        let table = extract_kind(&dataset, kind, CountPolicy::Strict).unwrap();
        for column in &table.columns {
            assert_eq!(column.data.len(), table.row_count(), "{kind} {}", column.name());
        }
    }
}

#[test]
fn test_column_order_interleaves_timestamps() {
    let dataset = glm_dataset();

    let groups = extract_kind(&dataset, RecordKind::Group, CountPolicy::Strict).unwrap();
    assert_eq!(
        names(&groups),
        [
            "geometry",
            "id",
            "time",
            "time_offset",
            "frame_time",
            "frame_time_offset",
            "area",
            "energy",
            "quality_flag",
            "parent_flash_id"
        ]
    );

    let flashes = extract_kind(&dataset, RecordKind::Flash, CountPolicy::Strict).unwrap();
    assert_eq!(
        names(&flashes),
        [
            "geometry",
            "id",
            "time_of_first_event",
            "time_offset_of_first_event",
            "time_of_last_event",
            "time_offset_of_last_event",
            "frame_time_of_first_event",
            "frame_time_offset_of_first_event",
            "frame_time_of_last_event",
            "frame_time_offset_of_last_event",
            "area",
            "energy",
            "quality_flag"
        ]
    );
    let last = timestamps_of(&flashes, "time_of_last_event");
    assert_eq!(last[0], Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 40).unwrap());
}

#[test]
fn test_unit_policy() {
    let mut dataset = glm_dataset();
    dataset.insert_variable(
        Variable::new("group_area", "number_of_groups", ArrayData::Float32(vec![1.0, 2.0]))
            .with_attribute("units", "percent")
            .with_attribute("long_name", "group area coverage"),
    );
    let table = extract_kind(&dataset, RecordKind::Group, CountPolicy::Strict).unwrap();

    let area = table.column("area").unwrap();
    assert_eq!(area.descriptor.unit.as_deref(), Some("%"));
    assert_eq!(area.descriptor.description.as_deref(), Some("group area coverage"));
    assert_eq!(table.column("quality_flag").unwrap().descriptor.unit, None);
    assert_eq!(
        table.column("energy").unwrap().descriptor.unit.as_deref(),
        Some("J")
    );
    assert_eq!(table.column("id").unwrap().descriptor.data_type, "int32");
}

#[test]
fn test_lenient_count_mismatch_uses_array_length() {
    let dataset = flash_dataset(4, vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]);
    let table = extract(&dataset, RecordKind::Flash, &["lat", "lon"], CountPolicy::Lenient).unwrap();
    assert_eq!(table.row_count(), 3);
}

#[test]
fn test_strict_count_mismatch_fails() {
    let dataset = flash_dataset(4, vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]);
    let err = extract(&dataset, RecordKind::Flash, &["lat", "lon"], CountPolicy::Strict).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::CountMismatch {
            kind: RecordKind::Flash,
            declared: 4,
            actual: 3
        }
    ));
}

#[test]
fn test_coordinate_mismatch_is_fatal() {
    let dataset = flash_dataset(4, vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let err = extract(&dataset, RecordKind::Flash, &["lat", "lon"], CountPolicy::Lenient).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::CoordinateLengthMismatch { lat: 3, lon: 5, .. }
    ));
}

#[test]
fn test_missing_count_is_treated_as_zero() {
    let mut dataset = flash_dataset(0, vec![1.0], vec![2.0]);
    dataset.variables.retain(|v| v.name != "flash_count");

    let lenient = extract(&dataset, RecordKind::Flash, &[], CountPolicy::Lenient).unwrap();
    assert_eq!(lenient.row_count(), 1);
    let strict = extract(&dataset, RecordKind::Flash, &[], CountPolicy::Strict);
    assert!(matches!(strict, Err(ExtractError::CountMismatch { declared: 0, .. })));
}

#[test]
fn test_missing_required_variable() {
    let mut dataset = glm_dataset();
    dataset.variables.retain(|v| v.name != "event_energy");
    let err = extract_kind(&dataset, RecordKind::Event, CountPolicy::Lenient).unwrap_err();
    assert!(matches!(err, ExtractError::MissingVariable(name) if name == "event_energy"));

    let mut dataset = glm_dataset();
    dataset.variables.retain(|v| v.name != "group_lat");
    let err = extract_kind(&dataset, RecordKind::Group, CountPolicy::Lenient).unwrap_err();
    assert!(matches!(err, ExtractError::MissingVariable(name) if name == "group_lat"));
}

#[test]
fn test_missing_frame_offsets_are_skipped() {
    let mut dataset = glm_dataset();
    dataset
        .variables
        .retain(|v| !v.name.contains("frame_time_offset"));

    let table = extract_kind(&dataset, RecordKind::Flash, CountPolicy::Strict).unwrap();
    assert!(table.column("frame_time_offset_of_first_event").is_none());
    assert!(table.column("frame_time_of_first_event").is_none());
    assert!(table.column("time_of_first_event").is_some());
}

#[test]
fn test_masked_offset_is_a_decode_error() {
    let mut dataset = glm_dataset();
    dataset.insert_variable(
        offset_variable("event_time_offset", "number_of_events", vec![0, -1, 5])
            .with_attribute("_FillValue", -1i64),
    );
    let err = extract_kind(&dataset, RecordKind::Event, CountPolicy::Lenient).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::TemporalDecode { ref variable, .. } if variable == "event_time_offset"
    ));
}

#[test]
fn test_unsigned_offsets_do_not_wrap() {
    let mut dataset = glm_dataset();
    dataset.insert_variable(offset_variable(
        "event_time_offset",
        "number_of_events",
        vec![0, -32768, 5],
    ));
    let table = extract_kind(&dataset, RecordKind::Event, CountPolicy::Lenient).unwrap();
    let offsets = &table.column("time_offset").unwrap().data;
    assert_eq!(
        offsets,
        &ColumnData::Float64(vec![Some(0.0), Some(32768.0), Some(5.0)])
    );
}

#[test]
fn test_invalid_epoch() {
    let mut dataset = glm_dataset();
    dataset.insert_variable(
        Variable::new("event_energy", "number_of_events", ArrayData::Float32(vec![0.0; 3]))
            .with_attribute("units", "seconds since the beginning"),
    );
    let err = extract_kind(&dataset, RecordKind::Event, CountPolicy::Lenient).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidEpoch { ref variable, .. } if variable == "event_energy"));
}

#[test]
fn test_field_length_mismatch() {
    let mut dataset = glm_dataset();
    dataset.insert_variable(Variable::new(
        "event_energy",
        "other",
        ArrayData::Float32(vec![1.0]),
    ));
    let err = extract_kind(&dataset, RecordKind::Event, CountPolicy::Lenient).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::FieldLengthMismatch { expected: 3, actual: 1, .. }
    ));
}

#[test]
fn test_masked_coordinates_become_nan() {
    let dataset = flash_dataset(2, vec![1.0, -999.0], vec![2.0, -999.0]);
    let mut dataset = dataset;
    for name in ["flash_lat", "flash_lon"] {
        dataset
            .variable_mut(name)
            .unwrap()
            .attributes
            .insert("_FillValue".to_string(), (-999.0).into());
    }
    let table = extract(&dataset, RecordKind::Flash, &[], CountPolicy::Strict).unwrap();
    assert_eq!(table.geometry[0], Point { x: 2.0, y: 1.0 });
    assert!(table.geometry[1].x.is_nan());
}

#[test]
fn test_convert_writes_three_files() {
    let dir = tempfile::tempdir().unwrap();
    let assets = convert(
        &glm_dataset(),
        dir.path(),
        CountPolicy::Strict,
        &WriterConfig::default(),
    )
    .unwrap();

    assert_eq!(
        assets.keys().collect::<Vec<_>>(),
        ["geoparquet_events", "geoparquet_flashes", "geoparquet_groups"]
    );
    assert_eq!(assets["geoparquet_events"].row_count, Some(3));
    assert_eq!(assets["geoparquet_groups"].row_count, Some(2));
    assert_eq!(assets["geoparquet_flashes"].row_count, Some(1));
    for file in ["events.parquet", "groups.parquet", "flashes.parquet"] {
        assert!(dir.path().join(file).exists());
    }
}
