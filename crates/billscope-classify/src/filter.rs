//! Relevance filter: passed AND child-safety relevant.

use billscope_core::{BillStatus, UNKNOWN_JURISDICTION};
use tracing::{info, warn};

use crate::classifier::ClassifiedBill;

/// The passed, relevant bills every aggregate statistic is computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisSubset<'a> {
    pub bills: Vec<ClassifiedBill<'a>>,
    /// Number of bills retained (equal to `bills.len()`).
    pub retained: usize,
    /// Passed, relevant bills left out because their jurisdiction is unknown.
    pub unattributed: usize,
}

impl<'a> AnalysisSubset<'a> {
    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedBill<'a>> {
        self.bills.iter()
    }
}

/// Stateless predicate selecting the analysis subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceFilter;

impl RelevanceFilter {
    /// A bill is retained iff its status is `Passed`, at least one
    /// relevance keyword matched, and its jurisdiction is known.
    pub fn retains(bill: &ClassifiedBill<'_>) -> bool {
        Self::qualifies(bill) && !Self::unattributed(bill)
    }

    pub fn apply<'a>(classified: Vec<ClassifiedBill<'a>>) -> AnalysisSubset<'a> {
        let total = classified.len();
        let mut unattributed = 0;
        let bills: Vec<ClassifiedBill<'a>> = classified
            .into_iter()
            .filter(|b| Self::qualifies(b))
            .filter(|b| {
                let drop = Self::unattributed(b);
                unattributed += usize::from(drop);
                !drop
            })
            .collect();
        let retained = bills.len();
        info!(total, retained, "filtered to passed, relevant bills");
        if unattributed > 0 {
            warn!(unattributed, "passed, relevant bills without a jurisdiction left out");
        }
        AnalysisSubset {
            bills,
            retained,
            unattributed,
        }
    }

    fn qualifies(bill: &ClassifiedBill<'_>) -> bool {
        bill.source.status == BillStatus::Passed && bill.is_relevant()
    }

    fn unattributed(bill: &ClassifiedBill<'_>) -> bool {
        bill.source.jurisdiction == UNKNOWN_JURISDICTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billscope_core::BillRecord;
    use std::collections::BTreeSet;

    fn record(status: BillStatus) -> BillRecord {
        record_in("Utah", status)
    }

    fn record_in(jurisdiction: &str, status: BillStatus) -> BillRecord {
        BillRecord {
            identifier: format!("{jurisdiction}:row0"),
            jurisdiction: jurisdiction.into(),
            status,
            status_raw: status.as_str().into(),
            title: String::new(),
            description: String::new(),
            themes: BTreeSet::new(),
            introduced_date: None,
        }
    }

    fn classified<'a>(record: &'a BillRecord, relevance: &[&str], provisions: &[&str]) -> ClassifiedBill<'a> {
        ClassifiedBill {
            source: record,
            matched_provisions: provisions.iter().map(|s| s.to_string()).collect(),
            relevance_hits: relevance.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn keeps_passed_relevant() {
        let r = record(BillStatus::Passed);
        let subset = RelevanceFilter::apply(vec![classified(&r, &["child"], &[])]);
        assert_eq!(subset.retained, 1);
        assert_eq!(subset.bills.len(), 1);
    }

    #[test]
    fn drops_non_passed_regardless_of_text() {
        let statuses = [
            BillStatus::Introduced,
            BillStatus::Failed,
            BillStatus::Engrossed,
            BillStatus::Enrolled,
            BillStatus::Vetoed,
            BillStatus::Other,
        ];
        let records: Vec<BillRecord> = statuses.iter().map(|s| record(*s)).collect();
        let bills = records
            .iter()
            .map(|r| classified(r, &["child", "minor"], &["age_verification"]))
            .collect();
        let subset = RelevanceFilter::apply(bills);
        assert!(subset.is_empty());
        assert_eq!(subset.retained, 0);
    }

    #[test]
    fn drops_passed_without_relevance() {
        let r = record(BillStatus::Passed);
        let subset = RelevanceFilter::apply(vec![classified(&r, &[], &["transparency"])]);
        assert!(subset.is_empty());
    }

    #[test]
    fn keeps_relevance_only_bills() {
        let r = record(BillStatus::Passed);
        let subset = RelevanceFilter::apply(vec![classified(&r, &["school"], &[])]);
        assert_eq!(subset.retained, 1);
        assert!(subset.bills[0].matched_provisions.is_empty());
    }

    #[test]
    fn unknown_jurisdiction_left_out_and_counted() {
        let utah = record(BillStatus::Passed);
        let unknown = record_in(UNKNOWN_JURISDICTION, BillStatus::Passed);
        let unknown_failed = record_in(UNKNOWN_JURISDICTION, BillStatus::Failed);
        let subset = RelevanceFilter::apply(vec![
            classified(&utah, &["minors"], &["age_verification"]),
            classified(&unknown, &["minors"], &["data_privacy"]),
            classified(&unknown_failed, &["minors"], &[]),
        ]);
        assert_eq!(subset.retained, 1);
        assert_eq!(subset.unattributed, 1);
        assert_eq!(subset.bills[0].source.jurisdiction, "Utah");
        assert!(!RelevanceFilter::retains(&classified(&unknown, &["minors"], &[])));
    }
}
