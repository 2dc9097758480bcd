//! Session state between load, filter and export actions
//!
//! A [`Session`] owns the canonical table of the current upload. Loading a new
//! file replaces it; every other action reads it and builds fresh values.

use tracing::info;

use crate::config::{InputFormat, ARCHIVE_CONTENT_TYPE, ARCHIVE_FILE_NAME};
use crate::error::{Error, Result};
use crate::export::{pack, ExportEngine, ExportOptions};
use crate::filter::{self, FilterSpec};
use crate::model::{AttributeValue, Column, Row, Table};
use crate::normalize::normalize_timestamps;
use crate::parser::ParserFactory;

/// A packed export ready for download
#[derive(Debug, Clone)]
pub struct Archive {
    /// ZIP bytes
    pub bytes: Vec<u8>,
    /// Suggested download name
    pub file_name: &'static str,
    /// MIME type of `bytes`
    pub content_type: &'static str,
    /// Member names in archive order
    pub members: Vec<String>,
    /// Total features across all members
    pub feature_count: usize,
}

/// Result of an export trigger
#[derive(Debug, Clone)]
pub enum ExportOutcome {
    /// The filter left no rows; nothing was packed
    Empty,
    Archive(Archive),
}

impl ExportOutcome {
    pub fn feature_count(&self) -> usize {
        match self {
            ExportOutcome::Empty => 0,
            ExportOutcome::Archive(archive) => archive.feature_count,
        }
    }
}

impl std::fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportOutcome::Empty => write!(f, "0 features"),
            ExportOutcome::Archive(archive) => write!(
                f,
                "{} features in {} files",
                archive.feature_count,
                archive.members.len()
            ),
        }
    }
}

/// Holds the loaded dataset for one user
#[derive(Default)]
pub struct Session {
    table: Option<Table>,
    factory: ParserFactory,
    options: ExportOptions,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExportOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Load and normalize a new upload, replacing any previous table.
    ///
    /// On failure the session is left without a table.
    pub fn load(&mut self, bytes: &[u8], format: InputFormat) -> Result<&Table> {
        self.table = None;
        let table = normalize_timestamps(&self.factory.parse(bytes, format)?);
        Ok(&*self.table.insert(table))
    }

    /// The canonical table, if one is loaded
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    fn require_table(&self) -> Result<&Table> {
        self.table.as_ref().ok_or(Error::NoTableLoaded)
    }

    /// First `n` rows of the canonical table
    pub fn preview(&self, n: usize) -> Result<&[Row]> {
        let table = self.require_table()?;
        Ok(&table.rows[..n.min(table.row_count())])
    }

    /// Columns offered for filtering (never the geometry column)
    pub fn filter_columns(&self) -> Result<&[Column]> {
        Ok(&self.require_table()?.columns)
    }

    /// Selectable values of a filter column, sorted by display text
    pub fn filter_options(&self, column: &str) -> Result<Vec<AttributeValue>> {
        let table = self.require_table()?;
        if table.column_index(column).is_none() {
            return Err(Error::UnknownColumn(column.to_string()));
        }
        let mut values = table.distinct_values(column);
        values.sort_by(|a, b| a.display().cmp(&b.display()));
        Ok(values)
    }

    /// Columns offered as split column
    pub fn split_candidates(&self, max_cardinality: usize) -> Result<Vec<&Column>> {
        Ok(self.require_table()?.split_candidates(max_cardinality))
    }

    /// Number of rows passing `spec`
    pub fn filtered_count(&self, spec: &FilterSpec) -> Result<usize> {
        Ok(filter::count(self.require_table()?, spec))
    }

    /// Filter, partition, serialize and pack in one step.
    ///
    /// Either a complete archive is returned or nothing is.
    pub fn export(&self, spec: &FilterSpec, split_column: &str) -> Result<ExportOutcome> {
        let table = self.require_table()?;
        let filtered = filter::apply(table, spec);

        if filtered.is_empty() {
            info!("0 features after filtering, skipping export");
            return Ok(ExportOutcome::Empty);
        }

        let artifact = ExportEngine::new(self.options).export(&filtered, split_column, spec)?;
        let bytes = pack(&artifact)?;

        info!(
            members = artifact.len(),
            bytes = bytes.len(),
            "archive written"
        );

        Ok(ExportOutcome::Archive(Archive {
            bytes,
            file_name: ARCHIVE_FILE_NAME,
            content_type: ARCHIVE_CONTENT_TYPE,
            members: artifact.names().map(str::to_string).collect(),
            feature_count: filtered.row_count(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "id,geom,status\n1,POINT (0 0),open\n2,POINT (1 1),closed\n";

    #[test]
    fn test_actions_require_table() {
        let session = Session::new();
        assert!(matches!(session.preview(10), Err(Error::NoTableLoaded)));
        assert!(matches!(
            session.export(&FilterSpec::new(), "status"),
            Err(Error::NoTableLoaded)
        ));
    }

    #[test]
    fn test_failed_load_clears_previous_table() {
        let mut session = Session::new();
        session.load(CSV.as_bytes(), InputFormat::Csv).unwrap();
        assert!(session.table().is_some());

        assert!(session.load(b"id,name\n1,a\n", InputFormat::Csv).is_err());
        assert!(session.table().is_none());
    }

    #[test]
    fn test_new_upload_replaces_table() {
        let mut session = Session::new();
        session.load(CSV.as_bytes(), InputFormat::Csv).unwrap();
        session
            .load(b"geom,kind\nPOINT (5 5),x\n", InputFormat::Csv)
            .unwrap();
        assert_eq!(session.filter_columns().unwrap()[0].name, "kind");
    }

    #[test]
    fn test_preview_is_bounded() {
        let mut session = Session::new();
        session.load(CSV.as_bytes(), InputFormat::Csv).unwrap();
        assert_eq!(session.preview(1).unwrap().len(), 1);
        assert_eq!(session.preview(100).unwrap().len(), 2);
    }

    #[test]
    fn test_filter_options_sorted() {
        let mut session = Session::new();
        session.load(CSV.as_bytes(), InputFormat::Csv).unwrap();
        let options = session.filter_options("status").unwrap();
        assert_eq!(options, vec![AttributeValue::from("closed"), AttributeValue::from("open")]);
        assert!(session.filter_options("geom").is_err());
    }

    #[test]
    fn test_export_outcome() {
        let mut session = Session::new();
        session.load(CSV.as_bytes(), InputFormat::Csv).unwrap();

        let outcome = session.export(&FilterSpec::new(), "status").unwrap();
        match &outcome {
            ExportOutcome::Archive(archive) => {
                assert_eq!(archive.file_name, "filtered_data.zip");
                assert_eq!(archive.content_type, "application/zip");
                assert_eq!(archive.members, vec!["status-open.geojson", "status-closed.geojson"]);
                assert!(archive.bytes.starts_with(b"PK"));
            }
            ExportOutcome::Empty => panic!("expected an archive"),
        }
        assert_eq!(outcome.feature_count(), 2);
    }
}
