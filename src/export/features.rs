//! GeoJSON serialization of partitions

use geojson::{Feature, FeatureCollection};
use serde_json::Map;

use crate::error::Result;
use crate::model::{Row, Table};

/// Build a FeatureCollection with one Feature per row.
///
/// Properties follow the table's column order.
pub fn to_feature_collection(table: &Table, rows: &[Row]) -> FeatureCollection {
    let features: Vec<Feature> = rows
        .iter()
        .map(|row| {
            let properties: Map<String, serde_json::Value> = table
                .columns
                .iter()
                .map(|col| {
                    let value = row
                        .get(col.index)
                        .map(|v| v.to_json())
                        .unwrap_or(serde_json::Value::Null);
                    (col.name.clone(), value)
                })
                .collect();

            Feature {
                bbox: None,
                geometry: row.geometry.clone(),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Serialize rows as a compact GeoJSON FeatureCollection string
pub fn to_geojson_string(table: &Table, rows: &[Row]) -> Result<String> {
    Ok(serde_json::to_string(&to_feature_collection(table, rows))?)
}
