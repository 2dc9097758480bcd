//! Partition-and-export engine

mod archive;
pub mod filename;
mod features;
mod partition;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::CollisionPolicy;
use crate::error::{Error, Result};
use crate::filter::FilterSpec;
use crate::model::Table;

pub use archive::pack;
pub use features::{to_feature_collection, to_geojson_string};
pub use partition::{partition, Partition};

/// Filename to GeoJSON document, in partition discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportArtifact {
    members: IndexMap<String, String>,
}

impl ExportArtifact {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member, refusing to overwrite an existing name
    pub fn insert(&mut self, name: String, document: String) -> Result<()> {
        if self.members.contains_key(&name) {
            return Err(Error::DuplicateFilename(name));
        }
        self.members.insert(name, document);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.members.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.members.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Options controlling an export
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    pub collision_policy: CollisionPolicy,
}

/// Splits a filtered table into named GeoJSON documents
pub struct ExportEngine {
    options: ExportOptions,
}

impl ExportEngine {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Partition `table` by `split_column` and serialize every partition.
    ///
    /// `spec` is the filter that produced `table`; it only contributes to
    /// member names.
    pub fn export(
        &self,
        table: &Table,
        split_column: &str,
        spec: &FilterSpec,
    ) -> Result<ExportArtifact> {
        let partitions = partition(table, split_column)?;
        let suffix = filename::filter_suffix(table, spec);

        let mut artifact = ExportArtifact::new();
        for part in &partitions {
            if filename::is_degenerate_fragment(&part.value) {
                warn!(
                    column = split_column,
                    value = %part.value,
                    "split value has no alphanumeric characters after sanitizing"
                );
            }

            let name = filename::sanitize(&filename::derive_filename(
                split_column,
                &part.value,
                suffix.as_deref(),
            ));
            let name = self.resolve_collision(&artifact, name)?;
            let document = to_geojson_string(table, &part.rows)?;

            debug!(member = %name, features = part.len(), "serialized partition");
            artifact.insert(name, document)?;
        }

        info!(
            split_column,
            partitions = artifact.len(),
            features = table.row_count(),
            "export prepared"
        );
        Ok(artifact)
    }

    fn resolve_collision(&self, artifact: &ExportArtifact, name: String) -> Result<String> {
        if !artifact.contains(&name) {
            return Ok(name);
        }
        match self.options.collision_policy {
            CollisionPolicy::Fail => Err(Error::DuplicateFilename(name)),
            CollisionPolicy::NumericSuffix => {
                let mut n = 2;
                let renamed = loop {
                    let candidate = filename::with_numeric_suffix(&name, n);
                    if !artifact.contains(&candidate) {
                        break candidate;
                    }
                    n += 1;
                };
                warn!(member = %renamed, "filename collision resolved with numeric suffix");
                Ok(renamed)
            }
        }
    }
}

/// Convenience function to export with default options
pub fn export(table: &Table, split_column: &str, spec: &FilterSpec) -> Result<ExportArtifact> {
    ExportEngine::new(ExportOptions::default()).export(table, split_column, spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;

    fn table(values: &[&str]) -> Table {
        let mut table = Table::new(
            vec![Column::new("category", 0), Column::new("status", 1)],
            Column::geometry("geometry"),
        );
        for (i, v) in values.iter().enumerate() {
            table.add_row(
                vec![(*v).into(), "open".into()],
                Some(geojson::Geometry::new(geojson::Value::Point(vec![i as f64, 0.0]))),
                i + 1,
            );
        }
        table
    }

    fn feature_count(document: &str) -> usize {
        let doc: serde_json::Value = serde_json::from_str(document).unwrap();
        doc["features"].as_array().unwrap().len()
    }

    #[test]
    fn test_export_names_and_counts() {
        let artifact = export(&table(&["A", "A", "B"]), "category", &FilterSpec::new()).unwrap();
        let names: Vec<_> = artifact.names().collect();
        assert_eq!(names, vec!["category-A.geojson", "category-B.geojson"]);
        assert_eq!(feature_count(artifact.get("category-A.geojson").unwrap()), 2);
        assert_eq!(feature_count(artifact.get("category-B.geojson").unwrap()), 1);
    }

    #[test]
    fn test_export_names_include_filters() {
        let spec = FilterSpec::new().with("status", ["open"]);
        let artifact = export(&table(&["x y"]), "category", &spec).unwrap();
        let names: Vec<_> = artifact.names().collect();
        assert_eq!(names, vec!["category-x_y__filters__status-open.geojson"]);
    }

    #[test]
    fn test_collision_fails_by_default() {
        let err = export(&table(&["A/B", "A B"]), "category", &FilterSpec::new()).unwrap_err();
        assert!(matches!(err, Error::DuplicateFilename(name) if name == "category-A_B.geojson"));
    }

    #[test]
    fn test_collision_numeric_suffix() {
        let engine = ExportEngine::new(ExportOptions {
            collision_policy: CollisionPolicy::NumericSuffix,
        });
        let artifact = engine
            .export(&table(&["A/B", "A B", "A'B", "AB"]), "category", &FilterSpec::new())
            .unwrap();
        let names: Vec<_> = artifact.names().collect();
        assert_eq!(
            names,
            vec![
                "category-A_B.geojson",
                "category-A_B-2.geojson",
                "category-AB.geojson",
                "category-AB-2.geojson",
            ]
        );
    }

    #[test]
    fn test_degenerate_value_still_exported() {
        let artifact = export(&table(&["/"]), "category", &FilterSpec::new()).unwrap();
        assert!(artifact.contains("category-_.geojson"));
    }

    #[test]
    fn test_artifact_rejects_duplicates() {
        let mut artifact = ExportArtifact::new();
        artifact.insert("a".into(), "{}".into()).unwrap();
        assert!(matches!(
            artifact.insert("a".into(), "{}".into()),
            Err(Error::DuplicateFilename(_))
        ));
    }
}
