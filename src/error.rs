//! Error types for the load/filter/export pipeline

use thiserror::Error;

use crate::config::InputFormat;

/// Errors surfaced by any stage of the pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported file format: {0} (expected .geojson, .json or .csv)")]
    UnsupportedFormat(String),

    #[error("failed to parse {format} input: {message}")]
    Parse {
        format: InputFormat,
        message: String,
    },

    #[error("no geometry column found: expected a column whose name contains \"geom\"")]
    NoGeometryColumn,

    #[error("invalid geometry in column '{column}' at row {row}: {message}")]
    InvalidGeometry {
        column: String,
        row: usize,
        message: String,
    },

    #[error("duplicate filename in export: {0}")]
    DuplicateFilename(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("cannot split by the geometry column '{0}'")]
    GeometrySplitColumn(String),

    #[error("no dataset loaded")]
    NoTableLoaded,

    #[error("failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn parse(format: InputFormat, message: impl std::fmt::Display) -> Self {
        Error::Parse {
            format,
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
