//! End-to-end analysis: classify → filter → aggregate → statistics.

use billscope_classify::{LoadOutcome, LoadReport, RelevanceFilter, TopicClassifier};
use billscope_core::{BillRecord, BillStatus, KeywordTable};
use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::bundle::{
    ClassificationOverview, DataQuality, DatasetOverview, StatisticsBundle, TableProvenance,
};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::stats;

/// A validated keyword table and config, ready to analyse any number of datasets.
///
/// Holds no state between runs; every call derives its bundle from scratch.
#[derive(Debug, Clone)]
pub struct Pipeline {
    classifier: TopicClassifier,
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(table: KeywordTable, config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            classifier: TopicClassifier::new(table),
            config,
        })
    }

    /// Pipeline over the built-in keyword table and default config.
    pub fn builtin() -> Result<Self, AnalysisError> {
        Self::new(KeywordTable::builtin()?, AnalysisConfig::default())
    }

    pub fn table(&self) -> &KeywordTable {
        self.classifier.table()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse a loaded dataset, carrying its load report into the bundle.
    pub fn run(&self, outcome: &LoadOutcome) -> Result<StatisticsBundle, AnalysisError> {
        self.analyse(&outcome.records, &outcome.report)
    }

    /// Analyse records that did not come through the loader.
    pub fn run_records(&self, records: &[BillRecord]) -> Result<StatisticsBundle, AnalysisError> {
        let report = LoadReport {
            rows_seen: records.len(),
            rows_kept: records.len(),
            ..LoadReport::default()
        };
        self.analyse(records, &report)
    }

    fn analyse(
        &self,
        records: &[BillRecord],
        report: &LoadReport,
    ) -> Result<StatisticsBundle, AnalysisError> {
        if records.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }

        let classified = self.classifier.classify_batch(records);
        let summary = self.classifier.summary(&classified);
        debug!(
            relevant = summary.relevant,
            with_any_provision = summary.with_any_provision,
            "classified dataset"
        );
        let status_distribution = stats::status_distribution(&classified);
        let jurisdiction_activity = stats::jurisdiction_activity(&classified);

        let subset = RelevanceFilter::apply(classified);
        if subset.is_empty() {
            return Err(AnalysisError::EmptySubset {
                records: records.len(),
            });
        }

        let table = self.classifier.table();
        let scores = aggregate(&subset, table, &self.config);
        debug!(jurisdictions = scores.len(), "scored jurisdictions");

        let federal_label = self.config.federal_label.as_str();
        let federal_records = records.iter().filter(|r| r.is_federal(federal_label)).count();
        let overview = DatasetOverview {
            records_loaded: records.len(),
            rows_skipped: report.skipped_rows,
            state_records: records.len() - federal_records,
            federal_records,
            passed_records: records
                .iter()
                .filter(|r| r.status == BillStatus::Passed)
                .count(),
            passed_state_records: records
                .iter()
                .filter(|r| r.status == BillStatus::Passed && !r.is_federal(federal_label))
                .count(),
            subset_bills: subset.bills.len(),
            unattributed_bills: subset.unattributed,
            relevance_only_bills: stats::relevance_only_bills(&subset),
            jurisdictions_scored: scores.len(),
            date_range: stats::date_range(&subset),
        };

        let ratio = stats::federal_state_ratio(&subset, federal_label);
        let bundle = StatisticsBundle {
            keyword_table: TableProvenance::from(table),
            config: self.config.clone(),
            data_quality: DataQuality::from(report),
            overview,
            classification: ClassificationOverview::from(summary),
            tier_distribution: stats::tier_distribution(&scores),
            dispersion: stats::dispersion_index(&scores),
            provision_consensus: stats::provision_consensus(&scores, table),
            federal_state_ratio: ratio,
            yearly_bills: stats::yearly_bills(&subset),
            keyword_hits: stats::relevance_keyword_hits(&subset),
            ranking: stats::ranking(&scores, self.config.ranking_size),
            evidence_gaps: stats::evidence_gaps(&subset),
            status_distribution,
            jurisdiction_activity,
            state_introductions_by_year: stats::state_introductions_by_year(
                records,
                federal_label,
            ),
            jurisdiction_scores: scores,
        };

        info!(
            records = records.len(),
            subset = bundle.overview.subset_bills,
            jurisdictions = bundle.overview.jurisdictions_scored,
            ratio = %bundle.federal_state_ratio.display(),
            "analysis complete"
        );
        Ok(bundle)
    }
}
