//! JSON output format

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::model::CellType;
use crate::session::ExportOutcome;

use super::{OutputFormatter, Report};

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonColumn {
    name: String,
    #[serde(rename = "type")]
    cell_type: CellType,
    is_geometry: bool,
}

#[derive(Serialize)]
struct JsonExport {
    feature_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    archive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'static str>,
    members: Vec<String>,
}

#[derive(Serialize)]
struct JsonReport {
    input: String,
    feature_count: usize,
    filtered_count: usize,
    columns: Vec<JsonColumn>,
    split_candidates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extent: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<JsonExport>,
}

impl OutputFormatter for JsonOutput {
    fn render(&self, report: &Report<'_>, writer: &mut dyn Write) -> Result<()> {
        let table = report.table;

        let preview = (!report.stats_only).then(|| {
            table
                .rows
                .iter()
                .take(report.preview_rows)
                .map(|row| {
                    let properties: serde_json::Map<String, serde_json::Value> = table
                        .columns
                        .iter()
                        .map(|col| {
                            let value = row
                                .get(col.index)
                                .map(|v| v.to_json())
                                .unwrap_or(serde_json::Value::Null);
                            (col.name.clone(), value)
                        })
                        .collect();
                    let geometry = row
                        .geometry
                        .as_ref()
                        .and_then(|g| serde_json::to_value(g).ok())
                        .unwrap_or(serde_json::Value::Null);
                    serde_json::json!({ "properties": properties, "geometry": geometry })
                })
                .collect::<Vec<_>>()
        });

        let export = report.outcome.map(|outcome| match outcome {
            ExportOutcome::Empty => JsonExport {
                feature_count: 0,
                archive: None,
                content_type: None,
                members: Vec::new(),
            },
            ExportOutcome::Archive(archive) => JsonExport {
                feature_count: archive.feature_count,
                archive: Some(
                    report
                        .output_path
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| archive.file_name.to_string()),
                ),
                content_type: Some(archive.content_type),
                members: archive.members.clone(),
            },
        });

        let output = JsonReport {
            input: report.input.display().to_string(),
            feature_count: table.row_count(),
            filtered_count: report.filtered_count,
            columns: table
                .schema()
                .map(|c| JsonColumn {
                    name: c.name.clone(),
                    cell_type: c.inferred_type,
                    is_geometry: c.is_geometry,
                })
                .collect(),
            split_candidates: report
                .split_candidates
                .iter()
                .map(|c| c.name.clone())
                .collect(),
            extent: table
                .extent()
                .map(|r| [r.min().x, r.min().y, r.max().x, r.max().y]),
            preview,
            export,
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputFormat;
    use crate::session::Session;
    use std::path::Path;

    #[test]
    fn test_json_report() {
        let mut session = Session::new();
        let table = session
            .load(b"status,geom\nopen,POINT (1 2)\nclosed,POINT (3 4)\n", InputFormat::Csv)
            .unwrap();

        let report = Report {
            input: Path::new("sites.csv"),
            table,
            preview_rows: 1,
            filtered_count: 1,
            split_candidates: table.split_candidates(100),
            outcome: None,
            output_path: None,
            stats_only: false,
        };

        let mut out = Vec::new();
        JsonOutput::compact().render(&report, &mut out).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(doc["feature_count"], 2);
        assert_eq!(doc["filtered_count"], 1);
        assert_eq!(doc["columns"][1]["name"], "geom");
        assert_eq!(doc["columns"][1]["is_geometry"], true);
        assert_eq!(doc["preview"].as_array().unwrap().len(), 1);
        assert_eq!(doc["preview"][0]["geometry"]["type"], "Point");
        assert_eq!(doc["preview"][0]["properties"]["status"], "open");
        assert_eq!(doc["extent"], serde_json::json!([1.0, 2.0, 3.0, 4.0]));
        assert!(doc.get("export").is_none());
    }

    #[test]
    fn test_preview_keeps_property_named_like_geometry() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 0]},
             "properties": {"geometry": "survey"}}
        ]}"#;
        let mut session = Session::new();
        let table = session.load(text.as_bytes(), InputFormat::GeoJson).unwrap();

        let report = Report {
            input: Path::new("sites.geojson"),
            table,
            preview_rows: 10,
            filtered_count: 1,
            split_candidates: Vec::new(),
            outcome: None,
            output_path: None,
            stats_only: false,
        };

        let mut out = Vec::new();
        JsonOutput::compact().render(&report, &mut out).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(doc["preview"][0]["properties"]["geometry"], "survey");
        assert_eq!(doc["preview"][0]["geometry"]["type"], "Point");
    }
}
