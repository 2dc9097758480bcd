//! Table and Row data structures

use geo::BoundingRect;
use indexmap::IndexSet;
use rustc_hash::FxHashSet;

use super::schema::{CellType, Column};
use super::value::AttributeValue;

/// A row in the table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Attribute values in column order
    pub cells: Vec<AttributeValue>,
    /// Row geometry; `None` when absent or null in the source
    pub geometry: Option<geojson::Geometry>,
    /// Original record number in the source (1-indexed)
    pub source_line: usize,
}

impl Row {
    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.cells.get(index)
    }
}

/// A table of attribute columns plus one designated geometry column
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Attribute column descriptors, in source order
    pub columns: Vec<Column>,
    /// Descriptor of the geometry column
    pub geometry_column: Column,
    /// All rows in the table
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(columns: Vec<Column>, geometry_column: Column) -> Self {
        Self {
            columns,
            geometry_column,
            rows: Vec::new(),
        }
    }

    /// Add a row to the table, padding missing cells with nulls
    pub fn add_row(
        &mut self,
        mut cells: Vec<AttributeValue>,
        geometry: Option<geojson::Geometry>,
        source_line: usize,
    ) {
        cells.resize(self.columns.len(), AttributeValue::Null);
        self.rows.push(Row {
            cells,
            geometry,
            source_line,
        });
    }

    /// Build a table with this table's schema and the given rows
    pub fn with_rows(&self, rows: Vec<Row>) -> Table {
        Table {
            columns: self.columns.clone(),
            geometry_column: self.geometry_column.clone(),
            rows,
        }
    }

    /// All column descriptors: attribute columns followed by the geometry column
    pub fn schema(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().chain(std::iter::once(&self.geometry_column))
    }

    /// Names of the attribute (non-geometry) columns
    pub fn attribute_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of attribute columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct values of a column in first-seen order
    pub fn distinct_values(&self, name: &str) -> Vec<AttributeValue> {
        let Some(idx) = self.column_index(name) else {
            return Vec::new();
        };
        let values: IndexSet<&AttributeValue> =
            self.rows.iter().filter_map(|r| r.get(idx)).collect();
        values.into_iter().cloned().collect()
    }

    /// Attribute columns with at most `max_cardinality` distinct values
    pub fn split_candidates(&self, max_cardinality: usize) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|col| {
                let mut seen: FxHashSet<&AttributeValue> = FxHashSet::default();
                for row in &self.rows {
                    if let Some(cell) = row.get(col.index) {
                        seen.insert(cell);
                        if seen.len() > max_cardinality {
                            return false;
                        }
                    }
                }
                true
            })
            .collect()
    }

    /// Infer column types from data
    pub fn infer_column_types(&mut self) {
        for col_idx in 0..self.column_count() {
            let mut inferred = CellType::Null;

            for row in &self.rows {
                if let Some(cell) = row.cells.get(col_idx) {
                    inferred = inferred.widen(cell.cell_type());
                }
            }

            if let Some(col) = self.columns.get_mut(col_idx) {
                col.inferred_type = inferred;
            }
        }
    }

    /// Bounding box over all row geometries, if any can be computed
    pub fn extent(&self) -> Option<geo::Rect<f64>> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;

        for geometry in self.rows.iter().filter_map(|r| r.geometry.as_ref()) {
            let Ok(geometry) = geo::Geometry::<f64>::try_from(geometry.clone()) else {
                continue;
            };
            if let Some(bbox) = geometry.bounding_rect() {
                let (min_x, min_y, max_x, max_y) =
                    bounds.unwrap_or((f64::MAX, f64::MAX, f64::MIN, f64::MIN));
                bounds = Some((
                    min_x.min(bbox.min().x),
                    min_y.min(bbox.min().y),
                    max_x.max(bbox.max().x),
                    max_y.max(bbox.max().y),
                ));
            }
        }

        bounds.map(|(min_x, min_y, max_x, max_y)| {
            geo::Rect::new(
                geo::coord! { x: min_x, y: min_y },
                geo::coord! { x: max_x, y: max_y },
            )
        })
    }
}
