//! JSON parser: FeatureCollections, arrays of objects, or single objects

use geojson::GeoJson;
use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::config::InputFormat;
use crate::error::{Error, Result};
use crate::model::{find_geometry_column, AttributeValue, Column, Table};

use super::geojson::table_from_geojson;
use super::{parse_wkt, Parser};

/// Parser for JSON files
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, bytes: &[u8]) -> Result<Table> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| Error::parse(InputFormat::Json, e))?;

        if is_feature_collection(&value) {
            let geojson = GeoJson::from_json_value(value)
                .map_err(|e| Error::parse(InputFormat::Json, e))?;
            return Ok(table_from_geojson(geojson));
        }

        // Handle both arrays and single objects
        let array = match value {
            Value::Array(arr) => arr,
            Value::Object(_) => vec![value],
            _ => {
                return Err(Error::parse(
                    InputFormat::Json,
                    "JSON must be an array of objects or an object",
                ))
            }
        };

        let objects = array
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(obj) => Ok(obj),
                _ => Err(Error::parse(
                    InputFormat::Json,
                    format!("array element {} is not an object", i + 1),
                )),
            })
            .collect::<Result<Vec<&Map<String, Value>>>>()?;

        table_from_objects(&objects)
    }

    fn format(&self) -> InputFormat {
        InputFormat::Json
    }
}

fn is_feature_collection(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("FeatureCollection")
}

fn table_from_objects(objects: &[&Map<String, Value>]) -> Result<Table> {
    // Collect all unique keys across all objects to build column list
    let mut column_names: IndexSet<&str> = IndexSet::new();
    for obj in objects {
        for key in obj.keys() {
            column_names.insert(key.as_str());
        }
    }

    let geom_idx = find_geometry_column(column_names.iter().copied())
        .ok_or(Error::NoGeometryColumn)?;
    let geom_name = column_names[geom_idx];

    let attribute_names: Vec<&str> = column_names
        .iter()
        .copied()
        .filter(|name| *name != geom_name)
        .collect();

    let columns: Vec<Column> = attribute_names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(*name, i))
        .collect();

    let mut table = Table::new(columns, Column::geometry(geom_name));

    for (line_num, obj) in objects.iter().enumerate() {
        let row = line_num + 1;
        let geometry = match obj.get(geom_name) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => parse_wkt(text, geom_name, row)?,
            Some(other) => {
                return Err(Error::InvalidGeometry {
                    column: geom_name.to_string(),
                    row,
                    message: format!("expected a WKT string, found {}", other),
                })
            }
        };

        let cells = attribute_names
            .iter()
            .map(|key| {
                obj.get(*key)
                    .map(AttributeValue::from_json)
                    .unwrap_or(AttributeValue::Null)
            })
            .collect();

        table.add_row(cells, geometry, row);
    }

    Ok(table)
}
