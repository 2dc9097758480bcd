//! Output formatting for run reports

mod json;
mod terminal;

use std::io::Write;
use std::path::Path;

use crate::config::OutputFormat;
use crate::error::Result;
use crate::model::{Column, Table};
use crate::session::ExportOutcome;

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Everything one run has to show
pub struct Report<'a> {
    /// Input file as given by the user
    pub input: &'a Path,
    /// Canonical table
    pub table: &'a Table,
    /// Number of rows to preview
    pub preview_rows: usize,
    /// Rows passing the filter
    pub filtered_count: usize,
    /// Columns eligible as split column
    pub split_candidates: Vec<&'a Column>,
    /// Export result, when an export was requested
    pub outcome: Option<&'a ExportOutcome>,
    /// Where the archive was written
    pub output_path: Option<&'a Path>,
    /// Skip the preview
    pub stats_only: bool,
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a report to a writer
    fn render(&self, report: &Report<'_>, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// Render a report to stdout
pub fn render_to_stdout(report: &Report<'_>, format: OutputFormat) -> Result<()> {
    let formatter = OutputFactory::create(format);
    let mut stdout = std::io::stdout();
    formatter.render(report, &mut stdout)
}
