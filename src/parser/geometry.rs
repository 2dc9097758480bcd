//! WKT geometry decoding for tabular inputs

use std::str::FromStr;

use crate::error::{Error, Result};

/// Parse a WKT cell into a GeoJSON geometry.
///
/// Blank cells are absent geometries. `row` is the 1-based source record.
pub fn parse_wkt(text: &str, column: &str, row: usize) -> Result<Option<geojson::Geometry>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let invalid = |message: String| Error::InvalidGeometry {
        column: column.to_string(),
        row,
        message,
    };

    let wkt = wkt::Wkt::<f64>::from_str(trimmed).map_err(|e| invalid(e.to_string()))?;
    let geometry = geo::Geometry::<f64>::try_from(wkt).map_err(|e| invalid(e.to_string()))?;

    Ok(Some(geojson::Geometry::new(geojson::Value::from(&geometry))))
}
