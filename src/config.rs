//! Configuration handling for geosplit

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::filter::FilterSpec;

/// Default number of rows shown in a preview
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

/// Default upper bound on distinct values for a split candidate column
pub const DEFAULT_MAX_SPLIT_CARDINALITY: usize = 100;

/// Default archive name offered for download
pub const ARCHIVE_FILE_NAME: &str = "filtered_data.zip";

/// Content type of the exported archive
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Declared encoding of an uploaded dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    GeoJson,
    Json,
    Csv,
}

impl InputFormat {
    /// Resolve the format from a file extension (without the leading dot)
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_lowercase().as_str() {
            "geojson" => Ok(InputFormat::GeoJson),
            "json" => Ok(InputFormat::Json),
            "csv" => Ok(InputFormat::Csv),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }

    /// Resolve the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }
}

impl std::str::FromStr for InputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim_start_matches('.'))
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::GeoJson => write!(f, "geojson"),
            InputFormat::Json => write!(f, "json"),
            InputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Output format for the run report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// What to do when two partitions sanitize to the same filename
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Abort the export with `Error::DuplicateFilename`
    #[default]
    Fail,
    /// Append `-2`, `-3`, ... to the stem of later members
    NumericSuffix,
}

/// Configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the input dataset
    pub input_file: PathBuf,
    /// Explicit input format; derived from the extension when unset
    pub input_format: Option<InputFormat>,
    /// Allowed values per column
    pub filters: FilterSpec,
    /// Column to partition the export by
    pub split_column: Option<String>,
    /// Where the archive is written
    pub output_path: PathBuf,
    /// Number of rows in the preview
    pub preview_rows: usize,
    /// Report format
    pub output_format: OutputFormat,
    /// Filename collision handling
    pub collision_policy: CollisionPolicy,
    /// Upper bound on distinct values for split candidates
    pub max_split_cardinality: usize,
    /// Only print counts, skip the preview
    pub stats_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::new(),
            input_format: None,
            filters: FilterSpec::new(),
            split_column: None,
            output_path: PathBuf::from(ARCHIVE_FILE_NAME),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            output_format: OutputFormat::default(),
            collision_policy: CollisionPolicy::default(),
            max_split_cardinality: DEFAULT_MAX_SPLIT_CARDINALITY,
            stats_only: false,
        }
    }
}

impl Config {
    /// Create a new Config for an input file
    pub fn new(input_file: PathBuf) -> Self {
        Self {
            input_file,
            ..Default::default()
        }
    }

    /// Set the input format explicitly
    pub fn with_input_format(mut self, format: InputFormat) -> Self {
        self.input_format = Some(format);
        self
    }

    /// Set the filter specification
    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    /// Set the split column
    pub fn with_split_column(mut self, column: impl Into<String>) -> Self {
        self.split_column = Some(column.into());
        self
    }

    /// Set the archive output path
    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_path = path;
        self
    }

    /// Set the number of preview rows
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// Set the report format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the filename collision policy
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Set the split candidate cardinality bound
    pub fn with_max_split_cardinality(mut self, max: usize) -> Self {
        self.max_split_cardinality = max;
        self
    }

    /// Enable stats-only mode
    pub fn with_stats_only(mut self, stats_only: bool) -> Self {
        self.stats_only = stats_only;
        self
    }

    /// Format declared by config, falling back to the file extension
    pub fn resolve_input_format(&self) -> Result<InputFormat> {
        match self.input_format {
            Some(format) => Ok(format),
            None => InputFormat::from_path(&self.input_file),
        }
    }
}
