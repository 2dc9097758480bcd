//! Timestamp normalization
//!
//! GeoJSON has no date/time encoding, so every timestamp in the table is
//! rewritten to a fixed ISO-8601 string before export.

use tracing::debug;

use crate::model::{AttributeValue, CellType, Table, TIMESTAMP_FORMAT};

/// Rewrite a single leaf if it is a timestamp
fn timestamp_to_string(value: &AttributeValue) -> Option<AttributeValue> {
    match value {
        AttributeValue::Timestamp(ts) => {
            Some(AttributeValue::String(ts.format(TIMESTAMP_FORMAT).to_string()))
        }
        _ => None,
    }
}

/// Return a copy of `table` with no timestamp values at any depth.
///
/// Column types are re-inferred from the cells first, then columns are
/// dispatched on their inferred type: scalar columns other than
/// timestamps are left as they are, structured and mixed columns are walked
/// recursively.
pub fn normalize_timestamps(table: &Table) -> Table {
    let mut normalized = table.clone();
    normalized.infer_column_types();

    let targets: Vec<usize> = normalized
        .columns
        .iter()
        .filter(|c| c.inferred_type == CellType::Timestamp || c.inferred_type.is_structured())
        .map(|c| c.index)
        .collect();

    if targets.is_empty() {
        return normalized;
    }

    let mut rewritten = 0usize;
    for row in &mut normalized.rows {
        for &idx in &targets {
            if let Some(cell) = row.cells.get_mut(idx) {
                if cell.any_leaf(&AttributeValue::is_timestamp) {
                    *cell = cell.map_leaves(&timestamp_to_string);
                    rewritten += 1;
                }
            }
        }
    }

    normalized.infer_column_types();
    debug!(columns = targets.len(), cells = rewritten, "normalized timestamps");
    normalized
}

/// Whether any timestamp remains in the table
pub fn has_timestamps(table: &Table) -> bool {
    table
        .rows
        .iter()
        .flat_map(|r| r.cells.iter())
        .any(|cell| cell.any_leaf(&AttributeValue::is_timestamp))
}
