use super::*;
use crate::asset::{FieldDescriptor, DATETIME_TYPE};
use crate::extract::{Column, SOURCE_CRS};
use arrow::array::Array;
use chrono::{TimeZone, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tempfile::tempdir;

fn sample_table() -> RecordTable {
    let t0 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    RecordTable {
        kind: RecordKind::Event,
        crs: SOURCE_CRS,
        geometry_descriptor: FieldDescriptor::new(GEOMETRY_COLUMN, "point"),
        geometry: vec![
            Point { x: -75.0, y: 10.0 },
            Point { x: -80.5, y: 12.5 },
            Point { x: f64::NAN, y: f64::NAN },
        ],
        columns: vec![
            Column {
                descriptor: FieldDescriptor::new("id", "uint32"),
                data: ColumnData::Int64(vec![Some(1), Some(2), Some(3)]),
            },
            Column {
                descriptor: FieldDescriptor::new("time", DATETIME_TYPE),
                data: ColumnData::Timestamp(vec![t0, t0, t0 + chrono::Duration::seconds(60)]),
            },
            Column {
                descriptor: FieldDescriptor::new("time_offset", "int16")
                    .with_unit(Some("seconds since 2020-01-01".to_string())),
                data: ColumnData::Float64(vec![Some(0.0), Some(0.0), Some(60.0)]),
            },
            Column {
                descriptor: FieldDescriptor::new("energy", "float32"),
                data: ColumnData::Float64(vec![Some(1e-15), None, Some(2e-15)]),
            },
        ],
    }
}

#[test]
fn test_write_and_summarize() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("events.parquet");
    let table = sample_table();

    let asset = GeoParquetWriter::default().write(&table, &path)?;
    assert_eq!(asset.row_count, Some(3));
    assert_eq!(asset.href.as_deref(), Some(path.display().to_string().as_str()));
    assert_eq!(
        asset.column_names(),
        ["geometry", "id", "time", "time_offset", "energy"]
    );
    assert_eq!(asset.title, "Processed GeoParquet file for events");

    let summary = GeoParquetSummary::open(&path)?;
    assert_eq!(summary.row_count, 3);
    assert_eq!(summary.primary_geometry(), asset.primary_geometry);
    assert_eq!(
        summary.column_names,
        asset.column_names().iter().map(|s| s.to_string()).collect::<Vec<_>>()
    );
    assert_eq!(summary.columns.as_ref(), Some(&asset.columns));

    let geo = &summary.geo.columns[GEOMETRY_COLUMN];
    assert_eq!(geo.encoding, "WKB");
    assert_eq!(geo.geometry_types, ["Point"]);
    assert_eq!(geo.bbox, Some([-80.5, 10.0, -75.0, 12.5]));
    assert_eq!(summary.geo.version, GEOPARQUET_VERSION);
    Ok(())
}

#[test]
fn test_geo_metadata_carries_crs() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("events.parquet");
    GeoParquetWriter::default().write(&sample_table(), &path)?;

    let summary = GeoParquetSummary::open(&path)?;
    let crs = summary.geo.columns[GEOMETRY_COLUMN]
        .crs
        .as_ref()
        .expect("crs missing from geo metadata");
    assert_eq!(crs["id"]["authority"], "EPSG");
    assert_eq!(crs["id"]["code"], 4326);
    Ok(())
}

#[test]
fn test_crs_projjson() {
    assert_eq!(
        crs_projjson("EPSG:4326"),
        Some(serde_json::json!({ "id": { "authority": "EPSG", "code": 4326 } }))
    );
    assert_eq!(crs_projjson("OGC:CRS84"), None);
    assert_eq!(crs_projjson("4326"), None);
}

#[test]
fn test_geometry_round_trip() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("events.parquet");
    let table = sample_table();
    GeoParquetWriter::default().write(&table, &path)?;

    let points = read_geometry(&path)?;
    assert_eq!(points.len(), 3);
    assert_eq!(points[0], Point { x: -75.0, y: 10.0 });
    assert_eq!(points[1], Point { x: -80.5, y: 12.5 });
    assert!(points[2].x.is_nan() && points[2].y.is_nan());
    Ok(())
}

#[test]
fn test_timestamp_column_type() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("events.parquet");
    GeoParquetWriter::default().write(&sample_table(), &path)?;

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;
    let batches: Vec<RecordBatch> = reader.collect::<Result<_, _>>()?;
    let schema = batches[0].schema();
    assert_eq!(
        schema.field_with_name("time")?.data_type(),
        &DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
    );
    let energy = batches[0].column_by_name("energy").unwrap();
    assert_eq!(energy.null_count(), 1);
    Ok(())
}

#[test]
fn test_identical_tables_give_identical_files() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let first = dir.path().join("a.parquet");
    let second = dir.path().join("b.parquet");
    let writer = GeoParquetWriter::new(WriterConfig {
        compression: CompressionType::Snappy,
        ..Default::default()
    });
    writer.write(&sample_table(), &first)?;
    writer.write(&sample_table(), &second)?;

    assert_eq!(std::fs::read(&first)?, std::fs::read(&second)?);
    Ok(())
}

#[test]
fn test_empty_table() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("flashes.parquet");
    let mut table = sample_table();
    table.kind = RecordKind::Flash;
    table.geometry.clear();
    for column in &mut table.columns {
        column.data = match &column.data {
            ColumnData::Int64(_) => ColumnData::Int64(Vec::new()),
            ColumnData::Float64(_) => ColumnData::Float64(Vec::new()),
            ColumnData::Utf8(_) => ColumnData::Utf8(Vec::new()),
            ColumnData::Timestamp(_) => ColumnData::Timestamp(Vec::new()),
        };
    }

    let asset = GeoParquetWriter::default().write(&table, &path)?;
    assert_eq!(asset.row_count, Some(0));

    let summary = GeoParquetSummary::open(&path)?;
    assert_eq!(summary.row_count, 0);
    assert_eq!(summary.geo.columns[GEOMETRY_COLUMN].bbox, None);
    assert_eq!(summary.column_names.len(), 5);
    Ok(())
}

#[test]
fn test_ragged_table_is_rejected() {
    let dir = tempdir().unwrap();
    let mut table = sample_table();
    table.columns[0].data = ColumnData::Int64(vec![Some(1)]);

    let result = GeoParquetWriter::default().write(&table, &dir.path().join("bad.parquet"));
    assert!(matches!(result, Err(WriterError::InvalidData(_))));
}

#[test]
fn test_asset_template() {
    let template = asset_template(RecordKind::Group);
    assert!(template.is_template());
    assert_eq!(template.title, "Processed GeoParquet file for groups");
    assert_eq!(template.primary_geometry, GEOMETRY_COLUMN);
}
