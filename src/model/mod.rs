//! Data model for tabular data with geometry

mod schema;
mod table;
mod value;

pub use schema::{find_geometry_column, CellType, Column};
pub use table::{Row, Table};
pub use value::{parse_timestamp, AttributeValue, TIMESTAMP_FORMAT};
