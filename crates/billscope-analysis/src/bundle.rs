//! The statistics bundle handed to report writers, plus Arrow table views.

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Date32Builder, Float64Array, ListBuilder, RecordBatch, StringArray, StringBuilder,
    UInt32Array, UInt64Array,
};
use arrow::error::ArrowError;
use billscope_classify::{ClassificationSummary, LoadReport};
use billscope_core::{BillRecord, KeywordTable, tables};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::aggregate::JurisdictionScore;
use crate::config::AnalysisConfig;
use crate::stats::{
    DateRange, DispersionIndex, EvidenceGaps, FederalStateRatio, JurisdictionActivity, KeywordHit,
    ProvisionConsensus, Ranking, StatusCount, TierDistribution,
};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Identity of the keyword table a bundle was computed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableProvenance {
    pub version: String,
    /// Hex SHA-256 of the canonical table JSON.
    pub fingerprint: String,
    pub provisions: usize,
    pub relevance_keywords: usize,
}

impl From<&KeywordTable> for TableProvenance {
    fn from(table: &KeywordTable) -> Self {
        Self {
            version: table.version().to_string(),
            fingerprint: table.fingerprint().to_string(),
            provisions: table.vocabulary_size(),
            relevance_keywords: table.relevance().len(),
        }
    }
}

/// Row-level issues met while loading, copied from the load report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    pub rows_seen: usize,
    pub rows_kept: usize,
    pub skipped_rows: usize,
    pub malformed_rows: usize,
    pub missing_jurisdiction: usize,
    pub missing_status: usize,
    pub unrecognized_status: usize,
    pub unparsed_dates: usize,
    pub duplicate_identifiers: usize,
}

impl From<&LoadReport> for DataQuality {
    fn from(r: &LoadReport) -> Self {
        Self {
            rows_seen: r.rows_seen,
            rows_kept: r.rows_kept,
            skipped_rows: r.skipped_rows,
            malformed_rows: r.malformed_rows,
            missing_jurisdiction: r.missing_jurisdiction,
            missing_status: r.missing_status,
            unrecognized_status: r.unrecognized_status,
            unparsed_dates: r.unparsed_dates,
            duplicate_identifiers: r.duplicate_identifiers,
        }
    }
}

/// Provision and relevance matches over every loaded record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationOverview {
    pub bills: usize,
    pub with_any_provision: usize,
    pub relevant: usize,
    pub provision_counts: BTreeMap<String, usize>,
}

impl From<ClassificationSummary> for ClassificationOverview {
    fn from(s: ClassificationSummary) -> Self {
        Self {
            bills: s.bills,
            with_any_provision: s.with_any_provision,
            relevant: s.relevant,
            provision_counts: s.provision_counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub records_loaded: usize,
    pub rows_skipped: usize,
    pub state_records: usize,
    pub federal_records: usize,
    pub passed_records: usize,
    pub passed_state_records: usize,
    pub subset_bills: usize,
    /// Passed, relevant bills with no jurisdiction, kept out of every statistic.
    pub unattributed_bills: usize,
    /// Subset bills that matched relevance keywords but no provision.
    pub relevance_only_bills: usize,
    pub jurisdictions_scored: usize,
    pub date_range: Option<DateRange>,
}

/// Everything one analysis run produces.
///
/// Serialises to the same JSON for the same inputs, table, and config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsBundle {
    pub keyword_table: TableProvenance,
    pub config: AnalysisConfig,
    pub data_quality: DataQuality,
    pub overview: DatasetOverview,
    pub classification: ClassificationOverview,
    /// Sorted by jurisdiction.
    pub jurisdiction_scores: Vec<JurisdictionScore>,
    pub tier_distribution: TierDistribution,
    /// `None` only when no jurisdiction was scored.
    pub dispersion: Option<DispersionIndex>,
    pub provision_consensus: Vec<ProvisionConsensus>,
    pub federal_state_ratio: FederalStateRatio,
    pub yearly_bills: BTreeMap<i32, usize>,
    pub keyword_hits: Vec<KeywordHit>,
    pub ranking: Ranking,
    pub evidence_gaps: EvidenceGaps,
    /// Relevant bills in any status.
    pub status_distribution: Vec<StatusCount>,
    pub jurisdiction_activity: Vec<JurisdictionActivity>,
    /// Every non-federal record, relevant or not, by introduced year.
    pub state_introductions_by_year: BTreeMap<i32, usize>,
}

impl StatisticsBundle {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn score(&self, jurisdiction: &str) -> Option<&JurisdictionScore> {
        self.jurisdiction_scores
            .iter()
            .find(|s| s.jurisdiction == jurisdiction)
    }

    pub fn consensus(&self, provision: &str) -> Option<&ProvisionConsensus> {
        self.provision_consensus
            .iter()
            .find(|c| c.provision == provision)
    }

    /// Jurisdiction scores as an Arrow batch.
    pub fn scores_batch(&self) -> Result<RecordBatch, ArrowError> {
        scores_batch(&self.jurisdiction_scores)
    }

    /// Provision consensus as an Arrow batch.
    pub fn consensus_batch(&self) -> Result<RecordBatch, ArrowError> {
        consensus_batch(&self.provision_consensus)
    }
}

pub fn scores_batch(scores: &[JurisdictionScore]) -> Result<RecordBatch, ArrowError> {
    let mut provisions = ListBuilder::new(StringBuilder::new());
    for s in scores {
        for tag in &s.provisions_present {
            provisions.values().append_value(tag);
        }
        provisions.append(true);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            scores.iter().map(|s| s.jurisdiction.as_str()),
        )),
        Arc::new(UInt64Array::from_iter_values(
            scores.iter().map(|s| s.bill_count as u64),
        )),
        Arc::new(UInt32Array::from_iter_values(scores.iter().map(|s| s.score))),
        Arc::new(StringArray::from_iter_values(
            scores.iter().map(|s| s.tier.as_str()),
        )),
        Arc::new(provisions.finish()),
    ];
    RecordBatch::try_new(Arc::new(tables::jurisdiction_score_schema()), columns)
}

pub fn consensus_batch(consensus: &[ProvisionConsensus]) -> Result<RecordBatch, ArrowError> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            consensus.iter().map(|c| c.provision.as_str()),
        )),
        Arc::new(UInt64Array::from_iter_values(
            consensus.iter().map(|c| c.adopting_jurisdictions as u64),
        )),
        Arc::new(UInt64Array::from_iter_values(
            consensus.iter().map(|c| c.total_jurisdictions as u64),
        )),
        Arc::new(Float64Array::from_iter_values(
            consensus.iter().map(|c| c.adoption_rate),
        )),
        Arc::new(StringArray::from_iter_values(
            consensus.iter().map(|c| c.consensus_level.as_str()),
        )),
    ];
    RecordBatch::try_new(Arc::new(tables::provision_consensus_schema()), columns)
}

/// Normalised bill records as an Arrow batch.
pub fn bills_batch(records: &[BillRecord]) -> Result<RecordBatch, ArrowError> {
    let mut themes = ListBuilder::new(StringBuilder::new());
    let mut dates = Date32Builder::with_capacity(records.len());
    for r in records {
        for theme in &r.themes {
            themes.values().append_value(theme);
        }
        themes.append(true);
        dates.append_option(
            r.introduced_date
                .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
        );
    }

    let text = |f: fn(&BillRecord) -> &str| -> ArrayRef {
        Arc::new(StringArray::from_iter_values(records.iter().map(f)))
    };
    let columns: Vec<ArrayRef> = vec![
        text(|r| r.identifier.as_str()),
        text(|r| r.jurisdiction.as_str()),
        text(|r| r.status.as_str()),
        text(|r| r.status_raw.as_str()),
        text(|r| r.title.as_str()),
        text(|r| r.description.as_str()),
        Arc::new(themes.finish()),
        Arc::new(dates.finish()),
    ];
    RecordBatch::try_new(Arc::new(tables::bill_schema()), columns)
}
