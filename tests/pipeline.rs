use std::io::{Cursor, Read};

use geosplit::export::{self, partition, to_geojson_string};
use geosplit::filter::{self, FilterSpec};
use geosplit::model::AttributeValue;
use geosplit::normalize::{has_timestamps, normalize_timestamps};
use geosplit::parser::load;
use geosplit::{Error, ExportOutcome, InputFormat, Session};

const CATEGORIES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [10.0, 59.0]},
     "properties": {"name": "one", "category": "A"}},
    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [11.0, 60.0]},
     "properties": {"name": "two", "category": "A"}},
    {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
     "properties": {"name": "three", "category": "B"}}
  ]
}"#;

const SITES_CSV: &str = "id,geom_wkt,status\n\
1,POINT (10 59),open\n\
2,POINT (11 60),closed\n\
3,POINT (12 61),open\n\
4,\"LINESTRING (0 0, 1 1)\",closed\n";

fn read_members(bytes: &[u8]) -> Vec<(String, serde_json::Value)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut text = String::new();
            file.read_to_string(&mut text).unwrap();
            (file.name().to_string(), serde_json::from_str(&text).unwrap())
        })
        .collect()
}

#[test]
fn geojson_split_by_category() {
    let mut session = Session::new();
    session.load(CATEGORIES.as_bytes(), InputFormat::GeoJson).unwrap();

    let outcome = session.export(&FilterSpec::new(), "category").unwrap();
    let ExportOutcome::Archive(archive) = outcome else {
        panic!("expected an archive");
    };

    let members = read_members(&archive.bytes);
    let names: Vec<&str> = members.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["category-A.geojson", "category-B.geojson"]);

    let features_a = members[0].1["features"].as_array().unwrap();
    assert_eq!(members[0].1["type"], "FeatureCollection");
    assert_eq!(features_a.len(), 2);
    assert_eq!(features_a[0]["type"], "Feature");
    assert_eq!(features_a[0]["geometry"]["coordinates"], serde_json::json!([10.0, 59.0]));
    assert_eq!(features_a[1]["properties"]["name"], "two");
    assert_eq!(members[1].1["features"].as_array().unwrap().len(), 1);
}

#[test]
fn csv_filter_by_status() {
    let mut session = Session::new();
    session.load(SITES_CSV.as_bytes(), InputFormat::Csv).unwrap();

    let spec = FilterSpec::new().with("status", ["open"]);
    assert_eq!(session.filtered_count(&spec).unwrap(), 2);

    let outcome = session.export(&spec, "status").unwrap();
    let ExportOutcome::Archive(archive) = outcome else {
        panic!("expected an archive");
    };
    assert_eq!(archive.members, vec!["status-open__filters__status-open.geojson"]);
    assert_eq!(archive.feature_count, 2);
}

#[test]
fn json_without_geometry_column_fails() {
    let text = r#"[{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]"#;
    let mut session = Session::new();
    let err = session.load(text.as_bytes(), InputFormat::Json).unwrap_err();
    assert!(matches!(err, Error::NoGeometryColumn));
    assert!(session.table().is_none());
}

#[test]
fn geojson_timestamp_property_is_normalized() {
    let text = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 0]},
         "properties": {"seen": "2024-01-05 10:30:00.123", "nested": {"at": ["2023-12-31T23:59:59Z"]}}}
    ]}"#;

    let raw = load(text.as_bytes(), InputFormat::GeoJson).unwrap();
    assert!(raw.rows[0].cells[0].is_timestamp());

    let mut session = Session::new();
    let table = session.load(text.as_bytes(), InputFormat::GeoJson).unwrap();
    assert!(!has_timestamps(table));

    let AttributeValue::String(seen) = &table.rows[0].cells[0] else {
        panic!("expected a string");
    };
    assert_eq!(seen, "2024-01-05T10:30:00");
    assert_eq!(seen.len(), 19);
    assert_eq!(table.rows[0].cells[1].to_json()["at"][0], "2023-12-31T23:59:59");
}

#[test]
fn empty_filter_result_skips_export() {
    let mut session = Session::new();
    session.load(SITES_CSV.as_bytes(), InputFormat::Csv).unwrap();

    let spec = FilterSpec::new().with("status", ["demolished"]);
    assert_eq!(session.filtered_count(&spec).unwrap(), 0);

    let outcome = session.export(&spec, "status").unwrap();
    assert!(matches!(outcome, ExportOutcome::Empty));
    assert_eq!(outcome.to_string(), "0 features");
}

#[test]
fn empty_result_is_reported_before_split_validation() {
    let mut session = Session::new();
    session.load(SITES_CSV.as_bytes(), InputFormat::Csv).unwrap();

    let spec = FilterSpec::new().with("status", ["demolished"]);
    assert!(matches!(
        session.export(&spec, "no_such_column").unwrap(),
        ExportOutcome::Empty
    ));
}

#[test]
fn partitions_reconstruct_filtered_table() {
    let table = load(SITES_CSV.as_bytes(), InputFormat::Csv).unwrap();
    let spec = FilterSpec::new().with("id", [1i64, 2, 4]);
    let filtered = filter::apply(&table, &spec);

    let parts = partition(&filtered, "status").unwrap();
    let mut rebuilt: Vec<_> = parts.iter().flat_map(|p| p.rows.clone()).collect();
    rebuilt.sort_by_key(|r| r.source_line);
    assert_eq!(rebuilt, filtered.rows);

    for (i, a) in parts.iter().enumerate() {
        for b in &parts[i + 1..] {
            assert!(a.rows.iter().all(|r| !b.rows.contains(r)));
        }
    }
}

#[test]
fn geojson_round_trip_keeps_rows_and_values() {
    let text = r#"[
        {"id": 1, "geom": "POINT (1 2)", "tags": {"a": [1, 2]}, "when": "2020-02-02T02:02:02"},
        {"id": 2, "geom": "POLYGON ((0 0, 1 0, 1 1, 0 0))", "tags": null, "when": null}
    ]"#;
    let table = normalize_timestamps(&load(text.as_bytes(), InputFormat::Json).unwrap());

    let document = to_geojson_string(&table, &table.rows).unwrap();
    let reloaded = normalize_timestamps(&load(document.as_bytes(), InputFormat::GeoJson).unwrap());

    assert_eq!(reloaded.row_count(), table.row_count());
    assert_eq!(reloaded.attribute_names(), table.attribute_names());
    for (a, b) in table.rows.iter().zip(&reloaded.rows) {
        assert_eq!(a.cells, b.cells);
        assert_eq!(a.geometry, b.geometry);
    }
}

#[test]
fn filenames_are_unique_within_an_export() {
    let table = load(SITES_CSV.as_bytes(), InputFormat::Csv).unwrap();
    let artifact = export::export(&table, "id", &FilterSpec::new()).unwrap();
    let mut names: Vec<&str> = artifact.names().collect();
    let total = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), total);
    assert_eq!(total, 4);
}

#[test]
fn normalization_is_idempotent_on_loaded_data() {
    let table = load(CATEGORIES.as_bytes(), InputFormat::GeoJson).unwrap();
    let once = normalize_timestamps(&table);
    assert_eq!(normalize_timestamps(&once), once);
}

#[test]
fn empty_filter_is_identity() {
    let table = load(SITES_CSV.as_bytes(), InputFormat::Csv).unwrap();
    assert_eq!(filter::apply(&table, &FilterSpec::new()), table);
}
