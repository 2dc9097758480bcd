//! GeoJSON parser

use geojson::{Feature, GeoJson};
use indexmap::IndexSet;

use crate::config::InputFormat;
use crate::error::{Error, Result};
use crate::model::{AttributeValue, Column, Table};

use super::Parser;

/// Name given to the geometry column of GeoJSON inputs
pub const GEOMETRY_COLUMN: &str = "geometry";

/// Parser for GeoJSON documents
pub struct GeoJsonParser;

impl Parser for GeoJsonParser {
    fn parse(&self, bytes: &[u8]) -> Result<Table> {
        let geojson =
            GeoJson::from_reader(bytes).map_err(|e| Error::parse(InputFormat::GeoJson, e))?;
        Ok(table_from_geojson(geojson))
    }

    fn format(&self) -> InputFormat {
        InputFormat::GeoJson
    }
}

/// Build a table from a parsed GeoJSON document.
///
/// Property keys form the attribute columns in first-seen order.
pub(crate) fn table_from_geojson(geojson: GeoJson) -> Table {
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let mut column_names: IndexSet<String> = IndexSet::new();
    for feature in &features {
        if let Some(props) = &feature.properties {
            for key in props.keys() {
                column_names.insert(key.clone());
            }
        }
    }

    let columns: Vec<Column> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), i))
        .collect();

    let mut table = Table::new(columns, Column::geometry(GEOMETRY_COLUMN));

    for (line_num, feature) in features.into_iter().enumerate() {
        let cells = match &feature.properties {
            Some(props) => column_names
                .iter()
                .map(|key| {
                    props
                        .get(key)
                        .map(AttributeValue::from_json)
                        .unwrap_or(AttributeValue::Null)
                })
                .collect(),
            None => Vec::new(),
        };

        table.add_row(cells, feature.geometry, line_num + 1);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
             "properties": {"name": "a", "category": "A"}},
            {"type": "Feature", "geometry": null,
             "properties": {"category": "B", "extra": 5}}
        ]
    }"#;

    #[test]
    fn test_feature_collection() {
        let table = GeoJsonParser.parse(COLLECTION.as_bytes()).unwrap();
        assert_eq!(table.attribute_names(), vec!["name", "category", "extra"]);
        assert_eq!(table.geometry_column.name, "geometry");
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows[1].cells,
            vec![AttributeValue::Null, "B".into(), AttributeValue::Int(5)]
        );
        assert!(table.rows[0].geometry.is_some());
        assert!(table.rows[1].geometry.is_none());
    }

    #[test]
    fn test_single_feature() {
        let text = r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 0]},
                       "properties": {"when": "2024-03-01T08:00:00"}}"#;
        let table = GeoJsonParser.parse(text.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.rows[0].cells[0].is_timestamp());
    }

    #[test]
    fn test_bare_geometry() {
        let text = r#"{"type": "Point", "coordinates": [3, 4]}"#;
        let table = GeoJsonParser.parse(text.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_malformed() {
        let err = GeoJsonParser.parse(b"{\"type\": \"Nope\"}").unwrap_err();
        assert!(matches!(err, Error::Parse { format: InputFormat::GeoJson, .. }));
        assert!(GeoJsonParser.parse(b"not json").is_err());
    }
}
