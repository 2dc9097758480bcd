//! CSV file parser

use crate::config::InputFormat;
use crate::error::{Error, Result};
use crate::model::{find_geometry_column, AttributeValue, Column, Table};

use super::{parse_wkt, Parser};

/// Parser for CSV files with a WKT geometry column
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, bytes: &[u8]) -> Result<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        // Read headers
        let headers = csv_reader
            .headers()
            .map_err(|e| Error::parse(InputFormat::Csv, e))?
            .clone();

        let geom_idx = find_geometry_column(headers.iter()).ok_or(Error::NoGeometryColumn)?;
        let geom_name = headers.get(geom_idx).unwrap_or_default().to_string();

        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != geom_idx)
            .enumerate()
            .map(|(i, (_, name))| Column::new(name.to_string(), i))
            .collect();

        let mut table = Table::new(columns, Column::geometry(geom_name.clone()));

        // Read rows
        for (line_num, result) in csv_reader.records().enumerate() {
            let row = line_num + 2; // +2 for 1-indexing and header
            let record = result.map_err(|e| {
                Error::parse(InputFormat::Csv, format!("row {}: {}", row, e))
            })?;

            let geometry = parse_wkt(record.get(geom_idx).unwrap_or(""), &geom_name, row)?;

            let cells: Vec<AttributeValue> = record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != geom_idx)
                .map(|(_, s)| AttributeValue::infer_text(s))
                .collect();

            table.add_row(cells, geometry, row);
        }

        Ok(table)
    }

    fn format(&self) -> InputFormat {
        InputFormat::Csv
    }
}
