//! Bill records extracted from tracker export batches.
//!
//! The loader is tolerant: a row only fails when it has neither a
//! jurisdiction nor a status, and then it is dropped and counted rather than
//! reported as an error. Missing text becomes an empty string, missing or
//! unparseable dates become `None`. Built from Arrow RecordBatches returned
//! by the CSV reader or `DuckStore::bills()`.

use std::collections::{BTreeSet, HashSet};

use arrow::array::{Array, LargeStringArray, StringArray};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use billscope_core::{
    BillRecord, BillStatus, UNKNOWN_JURISDICTION, normalize_jurisdiction, parse_intro_date,
    split_themes,
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing '{0}' column")]
    MissingColumn(String),
}

/// Source column names for each bill field.
///
/// Defaults match the Technology Policy Tracking exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub jurisdiction: String,
    pub status: String,
    pub title: String,
    pub description: String,
    pub themes: String,
    pub introduced_date: String,
    pub bill_number: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            jurisdiction: "State".into(),
            status: "Status".into(),
            title: "Name".into(),
            description: "Description".into(),
            themes: "Themes".into(),
            introduced_date: "Intro Date".into(),
            bill_number: "Bill Number".into(),
        }
    }
}

/// Per-load data quality counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_seen: usize,
    pub rows_kept: usize,
    /// Rows dropped before becoming records: those with neither
    /// jurisdiction nor status, plus `malformed_rows`.
    pub skipped_rows: usize,
    /// Source rows whose field count did not match the header.
    pub malformed_rows: usize,
    /// Kept rows with no jurisdiction (given the default or `Unknown`).
    pub missing_jurisdiction: usize,
    /// Kept rows with no status (given `Other`).
    pub missing_status: usize,
    /// Kept rows whose status text matched no known status (given `Other`).
    pub unrecognized_status: usize,
    /// Non-blank dates that failed to parse.
    pub unparsed_dates: usize,
    /// Records sharing an identifier with an earlier record.
    pub duplicate_identifiers: usize,
}

/// Records plus the counters describing how they were coerced.
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub records: Vec<BillRecord>,
    pub report: LoadReport,
}

impl LoadOutcome {
    /// Concatenate two loads (e.g. the state and federal exports).
    pub fn merge(mut self, other: LoadOutcome) -> Self {
        self.records.extend(other.records);
        let r = &mut self.report;
        let o = other.report;
        r.rows_seen += o.rows_seen;
        r.rows_kept += o.rows_kept;
        r.skipped_rows += o.skipped_rows;
        r.malformed_rows += o.malformed_rows;
        r.missing_jurisdiction += o.missing_jurisdiction;
        r.missing_status += o.missing_status;
        r.unrecognized_status += o.unrecognized_status;
        r.unparsed_dates += o.unparsed_dates;
        r.duplicate_identifiers = count_duplicates(&self.records);
        self
    }

    /// Account for rows the reader rejected before they reached the loader.
    pub fn with_malformed_rows(mut self, rows: usize) -> Self {
        let r = &mut self.report;
        r.rows_seen += rows;
        r.skipped_rows += rows;
        r.malformed_rows += rows;
        self
    }
}

/// Converts export batches into [`BillRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct BillLoader {
    columns: ColumnMap,
    default_jurisdiction: Option<String>,
}

impl BillLoader {
    pub fn new(columns: ColumnMap) -> Self {
        Self {
            columns,
            default_jurisdiction: None,
        }
    }

    /// Jurisdiction for rows without one, e.g. `"Federal"` for the federal
    /// export which has no `State` column.
    pub fn with_default_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.default_jurisdiction = Some(jurisdiction.into());
        self
    }

    /// Load every row of every batch.
    ///
    /// Fails only when the status column, or the jurisdiction column with no
    /// default jurisdiction, is absent from a batch schema.
    pub fn load(&self, batches: &[RecordBatch]) -> Result<LoadOutcome, LoadError> {
        let mut records = Vec::new();
        let mut report = LoadReport::default();
        let cols = &self.columns;

        for batch in batches {
            let jurisdiction_col = batch.column_by_name(&cols.jurisdiction);
            if jurisdiction_col.is_none() && self.default_jurisdiction.is_none() {
                return Err(LoadError::MissingColumn(cols.jurisdiction.clone()));
            }
            let status_col = batch
                .column_by_name(&cols.status)
                .ok_or_else(|| LoadError::MissingColumn(cols.status.clone()))?;
            let title_col = batch.column_by_name(&cols.title);
            let description_col = batch.column_by_name(&cols.description);
            let themes_col = batch.column_by_name(&cols.themes);
            let date_col = batch.column_by_name(&cols.introduced_date);
            let number_col = batch.column_by_name(&cols.bill_number);

            for row in 0..batch.num_rows() {
                let row_number = report.rows_seen;
                report.rows_seen += 1;

                let jurisdiction = jurisdiction_col
                    .and_then(|c| get_cell(c.as_ref(), row))
                    .and_then(|s| normalize_jurisdiction(&s));
                let status_raw = get_cell(status_col.as_ref(), row)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());

                let (jurisdiction, status_raw) = match (jurisdiction, status_raw) {
                    (None, None) => {
                        report.skipped_rows += 1;
                        continue;
                    }
                    (j, s) => (j, s),
                };

                let jurisdiction = match jurisdiction {
                    Some(j) => j,
                    None => {
                        report.missing_jurisdiction += 1;
                        self.default_jurisdiction
                            .clone()
                            .unwrap_or_else(|| UNKNOWN_JURISDICTION.to_string())
                    }
                };

                let status = match status_raw.as_deref() {
                    None => {
                        report.missing_status += 1;
                        BillStatus::Other
                    }
                    Some(raw) => BillStatus::parse(raw).unwrap_or_else(|| {
                        report.unrecognized_status += 1;
                        BillStatus::Other
                    }),
                };

                let introduced_date = match date_col.and_then(|c| get_cell(c.as_ref(), row)) {
                    Some(raw) if !raw.trim().is_empty() => {
                        let parsed = parse_intro_date(&raw);
                        if parsed.is_none() {
                            report.unparsed_dates += 1;
                        }
                        parsed
                    }
                    _ => None,
                };

                let themes: BTreeSet<String> = themes_col
                    .and_then(|c| get_cell(c.as_ref(), row))
                    .map(|s| split_themes(&s).into_iter().collect())
                    .unwrap_or_default();

                let identifier = match number_col
                    .and_then(|c| get_cell(c.as_ref(), row))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                {
                    Some(number) => format!("{jurisdiction}:{number}"),
                    None => format!("{jurisdiction}:row{row_number}"),
                };

                records.push(BillRecord {
                    identifier,
                    jurisdiction,
                    status,
                    status_raw: status_raw.unwrap_or_default(),
                    title: text_cell(title_col, row),
                    description: text_cell(description_col, row),
                    themes,
                    introduced_date,
                });
            }
        }

        report.rows_kept = records.len();
        report.duplicate_identifiers = count_duplicates(&records);

        info!(
            rows = report.rows_seen,
            kept = report.rows_kept,
            skipped = report.skipped_rows,
            "loaded bill records"
        );
        if report.skipped_rows > 0 {
            warn!(
                skipped = report.skipped_rows,
                "dropped rows with neither jurisdiction nor status"
            );
        }
        if report.unrecognized_status > 0 {
            warn!(
                count = report.unrecognized_status,
                "unrecognised status values treated as other"
            );
        }

        Ok(LoadOutcome { records, report })
    }
}

fn count_duplicates(records: &[BillRecord]) -> usize {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|r| !seen.insert(r.identifier.as_str()))
        .count()
}

// ── Arrow extraction helpers ──

fn text_cell(col: Option<&arrow::array::ArrayRef>, row: usize) -> String {
    col.and_then(|c| get_cell(c.as_ref(), row))
        .unwrap_or_default()
}

/// Extract a cell as a string.
///
/// Utf8 and LargeUtf8 are read directly; any other type is rendered with
/// Arrow's display formatter so typed columns (e.g. DuckDB dates) still load.
fn get_cell(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
        return Some(arr.value(row).to_string());
    }
    if let Some(arr) = col.as_any().downcast_ref::<LargeStringArray>() {
        return Some(arr.value(row).to_string());
    }
    let options = FormatOptions::default();
    ArrayFormatter::try_new(col, &options)
        .ok()
        .map(|fmt| fmt.value(row).to_string())
}
