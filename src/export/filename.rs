//! Archive member naming

use crate::filter::FilterSpec;
use crate::model::{AttributeValue, Table};

/// Extension of every archive member
pub const EXTENSION: &str = ".geojson";

const FILTERS_MARKER: &str = "__filters__";

/// Describe the active filters for use in a filename.
///
/// Constrained columns appear in table column order (columns unknown to the
/// table follow in filter order); values within a column are sorted by their
/// display text. Returns `None` when nothing is constrained.
pub fn filter_suffix(table: &Table, spec: &FilterSpec) -> Option<String> {
    let mut constrained: Vec<(Option<usize>, &str, Vec<String>)> = spec
        .constrained()
        .map(|(column, values)| {
            let mut texts: Vec<String> = values.iter().map(|v| v.display().into_owned()).collect();
            texts.sort();
            (table.column_index(column), column, texts)
        })
        .collect();

    if constrained.is_empty() {
        return None;
    }

    // Stable sort keeps filter order among unknown columns
    constrained.sort_by_key(|(idx, _, _)| idx.unwrap_or(usize::MAX));

    let parts: Vec<String> = constrained
        .into_iter()
        .map(|(_, column, texts)| format!("{}-{}", column, texts.join("_")))
        .collect();

    Some(parts.join("-"))
}

/// Build the raw (unsanitized) member name for one partition
pub fn derive_filename(split_column: &str, value: &AttributeValue, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!(
            "{}-{}{}{}{}",
            split_column,
            value.display(),
            FILTERS_MARKER,
            suffix,
            EXTENSION
        ),
        None => format!("{}-{}{}", split_column, value.display(), EXTENSION),
    }
}

/// Make a name safe for common filesystems.
///
/// Applied in order: `/` to `_`, `\` to `_`, space to `_`, then double and
/// single quotes removed.
pub fn sanitize(name: &str) -> String {
    name.replace('/', "_")
        .replace('\\', "_")
        .replace(' ', "_")
        .replace('"', "")
        .replace('\'', "")
}

/// True when a value sanitizes to nothing but punctuation (or nothing at all)
pub fn is_degenerate_fragment(value: &AttributeValue) -> bool {
    !sanitize(&value.display())
        .chars()
        .any(|c| c.is_alphanumeric())
}

/// Insert `-2`, `-3`, ... before the extension
pub fn with_numeric_suffix(name: &str, n: usize) -> String {
    match name.strip_suffix(EXTENSION) {
        Some(stem) => format!("{}-{}{}", stem, n, EXTENSION),
        None => format!("{}-{}", name, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;

    fn table() -> Table {
        Table::new(
            vec![
                Column::new("category", 0),
                Column::new("status", 1),
                Column::new("region", 2),
            ],
            Column::geometry("geometry"),
        )
    }

    #[test]
    fn test_plain_name() {
        let name = derive_filename("category", &"A".into(), None);
        assert_eq!(name, "category-A.geojson");
    }

    #[test]
    fn test_suffix_uses_column_order() {
        let spec = FilterSpec::new()
            .with("region", ["west", "east"])
            .with("status", ["open"])
            .with("category", Vec::<AttributeValue>::new());

        let suffix = filter_suffix(&table(), &spec).unwrap();
        assert_eq!(suffix, "status-open-region-east_west");

        let name = derive_filename("category", &"A".into(), Some(&suffix));
        assert_eq!(name, "category-A__filters__status-open-region-east_west.geojson");
    }

    #[test]
    fn test_no_suffix_without_constraints() {
        let spec = FilterSpec::new().with("status", Vec::<AttributeValue>::new());
        assert_eq!(filter_suffix(&table(), &spec), None);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a/b\\c d\"e'f.geojson"), "a_b_c_def.geojson");
        assert_eq!(sanitize("A/B"), sanitize("A B"));
    }

    #[test]
    fn test_degenerate_fragment() {
        assert!(is_degenerate_fragment(&"/ '".into()));
        assert!(is_degenerate_fragment(&"".into()));
        assert!(!is_degenerate_fragment(&"x-1".into()));
    }

    #[test]
    fn test_numeric_suffix() {
        assert_eq!(with_numeric_suffix("a_b.geojson", 2), "a_b-2.geojson");
    }
}
