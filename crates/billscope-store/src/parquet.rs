//! Parquet output for derived tables.

use std::fs::File;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tracing::info;

use crate::StoreError;

/// Write a batch to a Parquet file, replacing any existing file.
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{AsArray, StringArray, UInt32Array};
    use arrow::datatypes::{DataType, Field, Schema, UInt32Type};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn written_file_reads_back() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("jurisdiction", DataType::Utf8, false),
            Field::new("score", DataType::UInt32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["Texas", "Utah"])),
                Arc::new(UInt32Array::from(vec![1, 3])),
            ],
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.parquet");
        write_parquet(&path, &batch).unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.collect::<Result<_, _>>().unwrap();
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 2);
        let scores = batches[0].column(1).as_primitive::<UInt32Type>();
        assert_eq!(scores.value(1), 3);
    }

    #[test]
    fn overwrites_existing_file() {
        let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::UInt32, false)]));
        let batch = |values: Vec<u32>| {
            RecordBatch::try_new(schema.clone(), vec![Arc::new(UInt32Array::from(values))]).unwrap()
        };
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("n.parquet");
        write_parquet(&path, &batch(vec![1, 2, 3])).unwrap();
        write_parquet(&path, &batch(vec![4])).unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap()).unwrap();
        assert_eq!(reader.metadata().file_metadata().num_rows(), 1);
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::UInt32, false)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(UInt32Array::from(vec![1]))]).unwrap();
        let result = write_parquet(Path::new("/nonexistent/dir/n.parquet"), &batch);
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
