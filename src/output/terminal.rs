//! Plain terminal output

use std::io::Write;

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::error::Result;
use crate::model::{Row, Table};
use crate::session::ExportOutcome;

use super::{OutputFormatter, Report};

const MAX_CELL_WIDTH: usize = 40;

/// Human-readable report with a boxed preview table
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }

    fn write_header(&self, report: &Report<'_>, writer: &mut dyn Write) -> Result<()> {
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            writer,
            " geosplit: {} ({} features, geometry column '{}')",
            report.input.display(),
            report.table.row_count(),
            report.table.geometry_column.name
        )?;
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_columns(&self, table: &Table, writer: &mut dyn Write) -> Result<()> {
        writeln!(writer, "Columns:")?;
        for column in table.schema() {
            writeln!(writer, "  {} ({})", column.name, column.inferred_type)?;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn write_preview(&self, table: &Table, rows: usize, writer: &mut dyn Write) -> Result<()> {
        let shown = &table.rows[..rows.min(table.row_count())];
        if shown.is_empty() {
            return Ok(());
        }

        writeln!(writer, "Data Preview (first {} rows):", shown.len())?;
        writeln!(writer, "{}", build_table(table, shown))?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_summary(&self, report: &Report<'_>, writer: &mut dyn Write) -> Result<()> {
        writeln!(writer, "Filtered features: {}", report.filtered_count)?;

        if let Some(rect) = report.table.extent() {
            writeln!(
                writer,
                "Extent: ({:.6}, {:.6}) to ({:.6}, {:.6})",
                rect.min().x,
                rect.min().y,
                rect.max().x,
                rect.max().y
            )?;
        }

        let candidates: Vec<&str> = report
            .split_candidates
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        writeln!(writer, "Split columns: {}", candidates.join(", "))?;
        Ok(())
    }

    fn write_outcome(&self, report: &Report<'_>, writer: &mut dyn Write) -> Result<()> {
        let Some(outcome) = report.outcome else {
            return Ok(());
        };

        writeln!(writer)?;
        match outcome {
            ExportOutcome::Empty => {
                writeln!(writer, "Export: 0 features, nothing to export")?;
            }
            ExportOutcome::Archive(archive) => {
                let target = report
                    .output_path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| archive.file_name.to_string());
                writeln!(writer, "Export: {} -> {}", outcome, target)?;
                for member in &archive.members {
                    writeln!(writer, "  {}", member)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, report: &Report<'_>, writer: &mut dyn Write) -> Result<()> {
        self.write_header(report, writer)?;
        if !report.stats_only {
            self.write_columns(report.table, writer)?;
            self.write_preview(report.table, report.preview_rows, writer)?;
        }
        self.write_summary(report, writer)?;
        self.write_outcome(report, writer)?;
        Ok(())
    }
}

fn build_table(table: &Table, rows: &[Row]) -> String {
    let mut builder = Builder::default();

    let mut header: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
    header.push(table.geometry_column.name.clone());
    builder.push_record(header);

    for row in rows {
        let mut record: Vec<String> = row
            .cells
            .iter()
            .map(|c| truncate(&c.display(), MAX_CELL_WIDTH))
            .collect();
        record.push(geometry_label(row).to_string());
        builder.push_record(record);
    }

    let mut rendered = builder.build();
    rendered.with(Style::modern());
    rendered.to_string()
}

fn geometry_label(row: &Row) -> &'static str {
    use geojson::Value;

    match row.geometry.as_ref().map(|g| &g.value) {
        None => "null",
        Some(Value::Point(_)) => "Point",
        Some(Value::MultiPoint(_)) => "MultiPoint",
        Some(Value::LineString(_)) => "LineString",
        Some(Value::MultiLineString(_)) => "MultiLineString",
        Some(Value::Polygon(_)) => "Polygon",
        Some(Value::MultiPolygon(_)) => "MultiPolygon",
        Some(Value::GeometryCollection(_)) => "GeometryCollection",
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
