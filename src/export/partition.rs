//! Grouping rows by the split column

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::model::{AttributeValue, Row, Table};

/// Rows sharing one value of the split column
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// The shared split-column value
    pub value: AttributeValue,
    /// Member rows in input order
    pub rows: Vec<Row>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Group rows by `column`, keeping distinct values in first-seen order.
///
/// Nulls form a single group. Every returned partition is non-empty.
pub fn partition(table: &Table, column: &str) -> Result<Vec<Partition>> {
    // Attribute columns win over a geometry column of the same name
    let idx = match table.column_index(column) {
        Some(idx) => idx,
        None if column == table.geometry_column.name => {
            return Err(Error::GeometrySplitColumn(column.to_string()));
        }
        None => return Err(Error::UnknownColumn(column.to_string())),
    };

    let mut groups: IndexMap<AttributeValue, Vec<Row>> = IndexMap::new();
    for row in &table.rows {
        let value = row.get(idx).cloned().unwrap_or(AttributeValue::Null);
        groups.entry(value).or_default().push(row.clone());
    }

    Ok(groups
        .into_iter()
        .map(|(value, rows)| Partition { value, rows })
        .collect())
}
