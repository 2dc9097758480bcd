//! Format loaders turning uploaded bytes into a canonical table

mod csv;
mod geojson;
mod geometry;
mod json;

use tracing::{debug, info};

use crate::config::InputFormat;
use crate::error::{Error, Result};
use crate::model::Table;

pub use self::csv::CsvParser;
pub use self::geojson::GeoJsonParser;
pub use self::geometry::parse_wkt;
pub use self::json::JsonParser;

/// Trait for parsing one input encoding
pub trait Parser: Send + Sync {
    /// Parse raw bytes and return a Table
    fn parse(&self, bytes: &[u8]) -> Result<Table>;

    /// The format this parser handles
    fn format(&self) -> InputFormat;
}

/// Factory for selecting a parser by declared format
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(GeoJsonParser),
                Box::new(JsonParser),
                Box::new(CsvParser),
            ],
        }
    }

    /// Get the parser for a format
    pub fn get_parser(&self, format: InputFormat) -> Result<&dyn Parser> {
        self.parsers
            .iter()
            .find(|p| p.format() == format)
            .map(|p| p.as_ref())
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))
    }

    /// Parse bytes with the parser for `format` and infer the column schema
    pub fn parse(&self, bytes: &[u8], format: InputFormat) -> Result<Table> {
        debug!(%format, bytes = bytes.len(), "loading dataset");
        let mut table = self.get_parser(format)?.parse(bytes)?;
        table.infer_column_types();

        info!(
            %format,
            rows = table.row_count(),
            columns = table.column_count(),
            geometry_column = %table.geometry_column.name,
            "dataset loaded"
        );
        for column in table.schema() {
            debug!(column = %column.name, kind = %column.inferred_type, "column type");
        }

        Ok(table)
    }
}

/// Load a dataset from bytes in the given format
pub fn load(bytes: &[u8], format: InputFormat) -> Result<Table> {
    ParserFactory::new().parse(bytes, format)
}
