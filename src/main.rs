//! geosplit - filter and split geospatial data into GeoJSON archives

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use geosplit::config::{CollisionPolicy, Config, InputFormat, OutputFormat};
use geosplit::export::ExportOptions;
use geosplit::filter::FilterSpec;
use geosplit::logging::init_logging;
use geosplit::output::{render_to_stdout, Report};
use geosplit::session::{ExportOutcome, Session};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliInputFormat {
    Geojson,
    Json,
    Csv,
}

impl From<CliInputFormat> for InputFormat {
    fn from(f: CliInputFormat) -> Self {
        match f {
            CliInputFormat::Geojson => InputFormat::GeoJson,
            CliInputFormat::Json => InputFormat::Json,
            CliInputFormat::Csv => InputFormat::Csv,
        }
    }
}

/// Filter a GeoJSON/JSON/CSV dataset and split it into per-category GeoJSON files (ZIP)
#[derive(Parser, Debug)]
#[command(name = "geosplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input dataset (.geojson, .json or .csv)
    input: PathBuf,

    /// Input format (defaults to the file extension)
    #[arg(long, value_enum)]
    format: Option<CliInputFormat>,

    /// Keep rows whose COLUMN is one of VALUES (comma-separated, repeatable)
    #[arg(short, long = "filter", value_name = "COLUMN=VALUES")]
    filters: Vec<String>,

    /// Column to split the export by; no archive is written without it
    #[arg(short, long)]
    split: Option<String>,

    /// Archive output path
    #[arg(short, long, default_value = "filtered_data.zip")]
    output: PathBuf,

    /// Number of rows to preview
    #[arg(long, default_value_t = geosplit::config::DEFAULT_PREVIEW_ROWS)]
    preview: usize,

    /// Report format
    #[arg(long, value_enum, default_value = "terminal")]
    output_format: CliOutputFormat,

    /// Rename colliding filenames with a numeric suffix instead of failing
    #[arg(long)]
    disambiguate: bool,

    /// Maximum distinct values for a column to be offered as split column
    #[arg(long, default_value_t = geosplit::config::DEFAULT_MAX_SPLIT_CARDINALITY)]
    max_split_cardinality: usize,

    /// Only show counts, not the preview
    #[arg(long)]
    stats_only: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::new(cli.input.clone())
        .with_output_path(cli.output)
        .with_preview_rows(cli.preview)
        .with_output_format(cli.output_format.into())
        .with_max_split_cardinality(cli.max_split_cardinality)
        .with_stats_only(cli.stats_only)
        .with_collision_policy(if cli.disambiguate {
            CollisionPolicy::NumericSuffix
        } else {
            CollisionPolicy::Fail
        });
    if let Some(format) = cli.format {
        config = config.with_input_format(format.into());
    }
    if let Some(split) = cli.split {
        config = config.with_split_column(split);
    }

    let filter_args = cli
        .filters
        .iter()
        .map(|arg| parse_filter_arg(arg))
        .collect::<Result<Vec<_>>>()?;

    let format = config.resolve_input_format()?;
    let bytes = std::fs::read(&config.input_file)
        .with_context(|| format!("Failed to read file: {}", config.input_file.display()))?;

    let mut session = Session::with_options(ExportOptions {
        collision_policy: config.collision_policy,
    });
    session
        .load(&bytes, format)
        .with_context(|| format!("Failed to load {}", config.input_file.display()))?;

    let table = session.table().context("dataset not loaded")?;

    let mut spec = FilterSpec::new();
    for (column, values) in &filter_args {
        if table.column_index(column).is_none() {
            bail!("Unknown filter column: {}", column);
        }
        spec.insert_text(table, column, values);
    }
    let config = config.with_filters(spec);

    let filtered_count = session.filtered_count(&config.filters)?;

    let outcome = match &config.split_column {
        Some(split) => {
            let outcome = session
                .export(&config.filters, split)
                .with_context(|| format!("Failed to export split by '{}'", split))?;
            if let ExportOutcome::Archive(archive) = &outcome {
                std::fs::write(&config.output_path, &archive.bytes).with_context(|| {
                    format!("Failed to write archive: {}", config.output_path.display())
                })?;
            }
            Some(outcome)
        }
        None => None,
    };

    let report = Report {
        input: &config.input_file,
        table,
        preview_rows: config.preview_rows,
        filtered_count,
        split_candidates: table.split_candidates(config.max_split_cardinality),
        outcome: outcome.as_ref(),
        output_path: match &outcome {
            Some(ExportOutcome::Archive(_)) => Some(config.output_path.as_path()),
            _ => None,
        },
        stats_only: config.stats_only,
    };

    render_to_stdout(&report, config.output_format)?;
    Ok(())
}

/// Split `COLUMN=V1,V2` into the column and its values
fn parse_filter_arg(arg: &str) -> Result<(String, Vec<String>)> {
    let Some((column, values)) = arg.split_once('=') else {
        bail!("Invalid filter '{}': expected COLUMN=VALUES", arg);
    };
    let column = column.trim();
    if column.is_empty() {
        bail!("Invalid filter '{}': empty column name", arg);
    }

    let values = values
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    Ok((column.to_string(), values))
}
