//! CSV ingestion into string-typed Arrow batches.
//!
//! Every column is read as nullable `Utf8`; typing and coercion belong to the
//! record loader, which counts what it could not parse. Rows whose field
//! count differs from the header are dropped and counted here, so one bad
//! line never rejects the whole export.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use tracing::{info, warn};

use crate::StoreError;

/// Rows per emitted batch.
const BATCH_ROWS: usize = 8192;

/// Batches read from one CSV export.
#[derive(Debug, Clone, Default)]
pub struct CsvExport {
    pub batches: Vec<RecordBatch>,
    /// Rows dropped for having more or fewer fields than the header.
    pub malformed_rows: usize,
}

impl CsvExport {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }
}

/// Read a headered CSV file into string-typed Arrow batches.
///
/// Empty cells become nulls. Invalid UTF-8 is replaced rather than rejected.
pub fn read_csv(path: &Path) -> Result<CsvExport, StoreError> {
    if !path.exists() {
        return Err(StoreError::CsvNotFound(path.to_path_buf()));
    }
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.byte_headers()?.clone();
    let schema: SchemaRef = Arc::new(Schema::new(
        headers
            .iter()
            .map(|h| Field::new(String::from_utf8_lossy(h), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let width = schema.fields().len();

    let mut export = CsvExport::default();
    let mut builders = new_builders(width);
    let mut pending = 0;

    for record in reader.byte_records() {
        let record = record?;
        if record.len() != width {
            export.malformed_rows += 1;
            warn!(
                line = record.position().map(|p| p.line()),
                fields = record.len(),
                expected = width,
                "skipping malformed CSV row"
            );
            continue;
        }
        for (builder, cell) in builders.iter_mut().zip(record.iter()) {
            if cell.is_empty() {
                builder.append_null();
            } else {
                builder.append_value(String::from_utf8_lossy(cell));
            }
        }
        pending += 1;
        if pending == BATCH_ROWS {
            export.batches.push(finish(&schema, &mut builders)?);
            pending = 0;
        }
    }
    if pending > 0 || export.batches.is_empty() {
        export.batches.push(finish(&schema, &mut builders)?);
    }

    info!(
        path = %path.display(),
        rows = export.num_rows(),
        malformed = export.malformed_rows,
        "read CSV"
    );
    Ok(export)
}

fn new_builders(width: usize) -> Vec<StringBuilder> {
    (0..width).map(|_| StringBuilder::new()).collect()
}

fn finish(schema: &SchemaRef, builders: &mut [StringBuilder]) -> Result<RecordBatch, StoreError> {
    let columns: Vec<ArrayRef> = builders
        .iter_mut()
        .map(|b| Arc::new(b.finish()) as ArrayRef)
        .collect();
    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn reads_all_columns_as_strings() {
        let f = csv_file(
            "State,Status,Name,Intro Date,Bill Number\n\
             Utah,Passed,Social Media Regulation,05/03/2024,152\n\
             Texas,Introduced,\"Online Safety, Minors\",01/02/2023,18\n",
        );
        let export = read_csv(f.path()).unwrap();
        assert_eq!(export.malformed_rows, 0);
        let batch = &export.batches[0];
        assert_eq!(batch.num_rows(), 2);
        for field in batch.schema().fields() {
            assert_eq!(field.data_type(), &DataType::Utf8);
        }

        let schema = batch.schema();
        let (idx, _) = schema.column_with_name("Bill Number").unwrap();
        assert_eq!(batch.column(idx).as_string::<i32>().value(0), "152");
        let (idx, _) = schema.column_with_name("Name").unwrap();
        assert_eq!(
            batch.column(idx).as_string::<i32>().value(1),
            "Online Safety, Minors"
        );
    }

    #[test]
    fn empty_cells_are_null() {
        let f = csv_file("State,Status\nUtah,\n,Passed\n");
        let export = read_csv(f.path()).unwrap();
        let batch = &export.batches[0];
        assert!(batch.column(1).is_null(0));
        assert!(batch.column(0).is_null(1));
    }

    #[test]
    fn ragged_rows_dropped_and_counted() {
        let f = csv_file(
            "State,Status,Description\n\
             Utah,Passed,Age verification for minors\n\
             Texas,Passed\n\
             Ohio,Passed,Child safety,extra\n\
             Iowa,Introduced,School safety\n",
        );
        let export = read_csv(f.path()).unwrap();
        assert_eq!(export.malformed_rows, 2);
        assert_eq!(export.num_rows(), 2);

        let batch = &export.batches[0];
        let states = batch.column(0).as_string::<i32>();
        assert_eq!(states.value(0), "Utah");
        assert_eq!(states.value(1), "Iowa");
    }

    #[test]
    fn header_only_file_gives_empty_batch() {
        let f = csv_file("State,Status\n");
        let export = read_csv(f.path()).unwrap();
        assert_eq!(export.batches.len(), 1);
        assert_eq!(export.num_rows(), 0);
        assert_eq!(export.batches[0].num_columns(), 2);
    }

    #[test]
    fn missing_file() {
        let result = read_csv(Path::new("/nonexistent/bills.csv"));
        assert!(matches!(result, Err(StoreError::CsvNotFound(_))));
    }
}
