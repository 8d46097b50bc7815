//! DuckDB staging for bill exports.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use duckdb::Connection;
use tracing::info;

use crate::StoreError;

/// DuckDB store holding raw bill exports as all-`VARCHAR` tables.
///
/// Columns keep their export names so the record loader's column map applies
/// unchanged to batches queried back out. Supports in-memory and persistent
/// (file-backed) modes.
pub struct DuckStore {
    conn: Connection,
}

impl DuckStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Open or create a persistent DuckDB database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Load a headered CSV export into `table`, every column as `VARCHAR`.
    ///
    /// Rows DuckDB cannot parse, including ragged ones, are skipped and
    /// recorded; see [`DuckStore::rejected_rows`].
    pub fn load_bills_csv(&self, table: &str, path: &Path) -> Result<usize, StoreError> {
        if !path.exists() {
            return Err(StoreError::CsvNotFound(path.to_path_buf()));
        }
        let sql = format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv('{}', header = true, all_varchar = true, store_rejects = true)",
            quote_ident(table),
            path.display().to_string().replace('\'', "''")
        );
        self.conn.execute_batch(&sql)?;
        let count = self.bill_count(table)?;
        info!(table, count, "loaded bill export");
        Ok(count)
    }

    /// Number of rows in `table`.
    pub fn bill_count(&self, table: &str) -> Result<usize, StoreError> {
        self.count(&format!("SELECT count(*)::BIGINT AS cnt FROM {}", quote_ident(table)))
    }

    /// Source lines rejected by CSV loads on this connection.
    pub fn rejected_rows(&self) -> Result<usize, StoreError> {
        self.count("SELECT count(DISTINCT (scan_id, line))::BIGINT AS cnt FROM reject_errors")
    }

    fn count(&self, sql: &str) -> Result<usize, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([])?.collect();
        let batch = batches.first().ok_or(StoreError::NoResults)?;
        let col = batch
            .column(0)
            .as_any()
            .downcast_ref::<arrow::array::Int64Array>()
            .ok_or_else(|| StoreError::Other("count column not i64".into()))?;
        Ok(col.value(0) as usize)
    }

    /// All rows of `table` as Arrow batches.
    pub fn bills(&self, table: &str) -> Result<Vec<RecordBatch>, StoreError> {
        self.query_arrow(&format!("SELECT * FROM {}", quote_ident(table)))
    }

    /// Raw status values in `table` with their row counts, most frequent first.
    ///
    /// Returns rows with columns `(status VARCHAR, n BIGINT)`.
    pub fn status_counts(
        &self,
        table: &str,
        status_column: &str,
    ) -> Result<Vec<RecordBatch>, StoreError> {
        let sql = format!(
            "SELECT {col} AS status, count(*)::BIGINT AS n
             FROM {table}
             GROUP BY {col}
             ORDER BY n DESC, status",
            col = quote_ident(status_column),
            table = quote_ident(table),
        );
        self.query_arrow(&sql)
    }

    // ── Escape hatch ──

    /// Execute arbitrary SQL and return Arrow RecordBatches.
    pub fn query_arrow(&self, sql: &str) -> Result<Vec<RecordBatch>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([])?.collect();
        Ok(batches)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::DataType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn export() -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(
            b"State,Status,Name,Bill Number\n\
              Utah,Passed,Social Media Regulation,152\n\
              Utah,Passed,Online Safety,464\n\
              Texas,Introduced,Minor Protections,18\n",
        )
        .unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn open_in_memory() {
        let store = DuckStore::open().unwrap();
        let batches = store.query_arrow("SELECT 1 AS x").unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 1);
    }

    #[test]
    fn load_missing_file_errors() {
        let store = DuckStore::open().unwrap();
        let result = store.load_bills_csv("bills", Path::new("/nonexistent/bills.csv"));
        assert!(matches!(result, Err(StoreError::CsvNotFound(_))));
    }

    #[test]
    fn load_export_as_varchar() {
        let f = export();
        let store = DuckStore::open().unwrap();
        assert_eq!(store.load_bills_csv("state_bills", f.path()).unwrap(), 3);

        let batches = store.bills("state_bills").unwrap();
        let schema = batches[0].schema();
        let (_, field) = schema.column_with_name("Bill Number").unwrap();
        assert_eq!(field.data_type(), &DataType::Utf8);
    }

    #[test]
    fn status_counts_ordered() {
        let f = export();
        let store = DuckStore::open().unwrap();
        store.load_bills_csv("state_bills", f.path()).unwrap();
        let batches = store.status_counts("state_bills", "Status").unwrap();
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 2);
        let status = batches[0]
            .column(0)
            .as_any()
            .downcast_ref::<arrow::array::StringArray>()
            .unwrap();
        assert_eq!(status.value(0), "Passed");
    }

    #[test]
    fn ragged_rows_skipped() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(
            b"State,Status,Name\n\
              Utah,Passed,Social Media Regulation\n\
              Texas,Passed,Online Safety,extra\n\
              Ohio,Introduced,Minor Protections\n",
        )
        .unwrap();
        f.flush().unwrap();
        let store = DuckStore::open().unwrap();
        assert_eq!(store.load_bills_csv("state_bills", f.path()).unwrap(), 2);
        assert_eq!(store.rejected_rows().unwrap(), 1);
    }

    #[test]
    fn clean_export_has_no_rejects() {
        let f = export();
        let store = DuckStore::open().unwrap();
        store.load_bills_csv("state_bills", f.path()).unwrap();
        assert_eq!(store.rejected_rows().unwrap(), 0);
    }

    #[test]
    fn persistent_store_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("bills.duckdb");
        let f = export();
        {
            let store = DuckStore::open_persistent(&db).unwrap();
            store.load_bills_csv("state_bills", f.path()).unwrap();
        }
        let store = DuckStore::open_persistent(&db).unwrap();
        assert_eq!(store.bill_count("state_bills").unwrap(), 3);
    }
}
