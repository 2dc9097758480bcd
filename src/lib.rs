//! geosplit - filter geospatial data and split it into GeoJSON archives
//!
//! Loads a GeoJSON, JSON or CSV dataset into one canonical table, normalizes
//! timestamps, filters rows by column values and exports one GeoJSON
//! FeatureCollection per value of a split column, packed into a ZIP archive.

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod session;

pub use config::{Config, InputFormat};
pub use error::{Error, Result};
pub use filter::FilterSpec;
pub use model::Table;
pub use session::{Archive, ExportOutcome, Session};
