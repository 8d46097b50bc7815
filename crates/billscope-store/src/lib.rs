//! Storage layer: CSV ingestion to Arrow, Parquet output, DuckDB staging (optional).

pub mod csv;
mod error;
pub mod parquet;

pub use self::csv::{CsvExport, read_csv};
pub use error::StoreError;
pub use self::parquet::write_parquet;

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;
