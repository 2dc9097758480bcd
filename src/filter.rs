//! Attribute filtering

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::model::{AttributeValue, Row, Table};

/// Allowed values per column.
///
/// A column that is absent, or present with an empty set, is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    entries: IndexMap<String, IndexSet<AttributeValue>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add allowed values for a column (builder form)
    pub fn with<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        self.insert(column, values);
        self
    }

    /// Add allowed values for a column, merging with any existing set
    pub fn insert<I, V>(&mut self, column: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        self.entries
            .entry(column.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    /// Add values given as text, resolved against the column's actual values.
    ///
    /// Each text selects the values whose display form equals it. Text that
    /// matches nothing is inferred the same way CSV cells are.
    pub fn insert_text(&mut self, table: &Table, column: &str, texts: &[String]) {
        let distinct = table.distinct_values(column);
        let values: Vec<AttributeValue> = texts
            .iter()
            .flat_map(|text| {
                let matched: Vec<AttributeValue> = distinct
                    .iter()
                    .filter(|v| v.display() == text.as_str())
                    .cloned()
                    .collect();
                if matched.is_empty() {
                    vec![AttributeValue::infer_text(text)]
                } else {
                    matched
                }
            })
            .collect();
        self.insert(column, values);
    }

    /// Allowed values for a column, if any were given
    pub fn get(&self, column: &str) -> Option<&IndexSet<AttributeValue>> {
        self.entries.get(column)
    }

    /// Entries with a non-empty value set, in insertion order
    pub fn constrained(&self) -> impl Iterator<Item = (&str, &IndexSet<AttributeValue>)> {
        self.entries
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(column, values)| (column.as_str(), values))
    }

    /// True when no entry constrains anything
    pub fn is_unconstrained(&self) -> bool {
        self.constrained().next().is_none()
    }
}

/// Keep the rows matching every constrained column, in input order.
///
/// A constraint on a column the table does not have matches no row.
pub fn apply(table: &Table, spec: &FilterSpec) -> Table {
    if spec.is_unconstrained() {
        return table.clone();
    }

    let rows: Vec<Row> = table
        .rows
        .iter()
        .filter(|row| matches(table, row, spec))
        .cloned()
        .collect();

    debug!(
        input = table.row_count(),
        output = rows.len(),
        "applied filter"
    );
    table.with_rows(rows)
}

/// Number of rows `apply` would keep
pub fn count(table: &Table, spec: &FilterSpec) -> usize {
    table
        .rows
        .iter()
        .filter(|row| matches(table, row, spec))
        .count()
}

fn matches(table: &Table, row: &Row, spec: &FilterSpec) -> bool {
    spec.constrained().all(|(column, allowed)| {
        table
            .column_index(column)
            .and_then(|idx| row.get(idx))
            .is_some_and(|value| allowed.contains(value))
    })
}
