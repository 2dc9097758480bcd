//! Column metadata and type information

use serde::Serialize;

/// Inferred semantic type for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum CellType {
    #[default]
    Null,
    Bool,
    Int,
    Float,
    String,
    Timestamp,
    Mapping,
    List,
    Mixed,
    Geometry,
}

impl CellType {
    /// Widen the type to accommodate another type
    pub fn widen(self, other: CellType) -> CellType {
        if self == other {
            return self;
        }

        match (self, other) {
            (CellType::Null, t) | (t, CellType::Null) => t,
            (CellType::Int, CellType::Float) | (CellType::Float, CellType::Int) => CellType::Float,
            _ => CellType::Mixed,
        }
    }

    /// Whether values of this type may hold nested values
    pub fn is_structured(self) -> bool {
        matches!(self, CellType::Mapping | CellType::List | CellType::Mixed)
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellType::Null => write!(f, "null"),
            CellType::Bool => write!(f, "bool"),
            CellType::Int => write!(f, "int"),
            CellType::Float => write!(f, "float"),
            CellType::String => write!(f, "string"),
            CellType::Timestamp => write!(f, "timestamp"),
            CellType::Mapping => write!(f, "mapping"),
            CellType::List => write!(f, "list"),
            CellType::Mixed => write!(f, "mixed"),
            CellType::Geometry => write!(f, "geometry"),
        }
    }
}

/// Column descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name (from header or property key)
    pub name: String,
    /// Position among the attribute columns (0-based)
    pub index: usize,
    /// Inferred type from data
    pub inferred_type: CellType,
    /// Whether this column holds the row geometry
    pub is_geometry: bool,
}

impl Column {
    /// Create a new attribute column with name and index
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            inferred_type: CellType::Null,
            is_geometry: false,
        }
    }

    /// Create the geometry column descriptor
    pub fn geometry(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: 0,
            inferred_type: CellType::Geometry,
            is_geometry: true,
        }
    }
}

/// Find the geometry source among column names.
///
/// The first name containing `geom` (case-insensitive) wins. Returns the
/// position of the chosen column.
pub fn find_geometry_column<'a, I>(names: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidates: Vec<(usize, &str)> = names
        .into_iter()
        .enumerate()
        .filter(|(_, name)| name.to_lowercase().contains("geom"))
        .collect();

    if candidates.len() > 1 {
        tracing::debug!(
            chosen = candidates[0].1,
            ignored = ?candidates[1..].iter().map(|(_, n)| *n).collect::<Vec<_>>(),
            "multiple geometry column candidates, using the first"
        );
    }

    candidates.first().map(|(i, _)| *i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen() {
        assert_eq!(CellType::Null.widen(CellType::Int), CellType::Int);
        assert_eq!(CellType::Int.widen(CellType::Float), CellType::Float);
        assert_eq!(CellType::String.widen(CellType::Timestamp), CellType::Mixed);
        assert_eq!(CellType::Mapping.widen(CellType::Mapping), CellType::Mapping);
    }

    #[test]
    fn test_find_geometry_column_first_wins() {
        assert_eq!(find_geometry_column(["id", "GEOM_WKT", "the_geom"]), Some(1));
        assert_eq!(find_geometry_column(["id", "name"]), None);
        assert_eq!(find_geometry_column(["Geometry"]), Some(0));
    }
}
