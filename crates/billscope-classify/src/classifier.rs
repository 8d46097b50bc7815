//! Keyword-based topic classification for bills.
//!
//! Each bill's title, description, and themes are lowercased and scanned for
//! every provision's patterns. A provision matches if any of its patterns
//! occurs as a substring. The relevance keyword set is scanned the same way
//! and independently.

use std::collections::{BTreeMap, BTreeSet};

use billscope_core::{BillRecord, KeywordTable};
use rayon::prelude::*;
use tracing::debug;

/// Keyword classifier over a fixed, validated [`KeywordTable`].
///
/// Classification is a pure function of the bill text and the table, so a
/// single classifier is shared by reference across rayon workers.
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    table: KeywordTable,
}

/// Classification result for a single bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedBill<'a> {
    pub source: &'a BillRecord,
    /// Provision tags with at least one matching pattern.
    pub matched_provisions: BTreeSet<String>,
    /// Relevance keywords found in the bill text.
    pub relevance_hits: BTreeSet<String>,
}

impl ClassifiedBill<'_> {
    pub fn is_relevant(&self) -> bool {
        !self.relevance_hits.is_empty()
    }
}

/// Match counts over a classified batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationSummary {
    pub bills: usize,
    pub with_any_provision: usize,
    pub relevant: usize,
    /// tag → number of bills matching it. Every vocabulary tag is present.
    pub provision_counts: BTreeMap<String, usize>,
}

impl TopicClassifier {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Match lowercased text against the table.
    ///
    /// Returns `(matched_provisions, relevance_hits)`.
    pub fn classify_text(&self, text: &str) -> (BTreeSet<String>, BTreeSet<String>) {
        let provisions = self
            .table
            .provisions()
            .filter(|(_, patterns)| patterns.iter().any(|p| text.contains(p.as_str())))
            .map(|(tag, _)| tag.to_string())
            .collect();

        let relevance = self
            .table
            .relevance()
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .cloned()
            .collect();

        (provisions, relevance)
    }

    /// Classify a single bill.
    pub fn classify<'a>(&self, record: &'a BillRecord) -> ClassifiedBill<'a> {
        let (matched_provisions, relevance_hits) = self.classify_text(&record.scan_text());
        ClassifiedBill {
            source: record,
            matched_provisions,
            relevance_hits,
        }
    }

    /// Classify a batch of bills in parallel.
    ///
    /// Output order matches input order.
    pub fn classify_batch<'a>(&self, records: &'a [BillRecord]) -> Vec<ClassifiedBill<'a>> {
        let classified: Vec<ClassifiedBill<'a>> =
            records.par_iter().map(|r| self.classify(r)).collect();
        debug!(
            bills = classified.len(),
            version = self.table.version(),
            "classified bills"
        );
        classified
    }

    /// Count provision and relevance matches over classified bills.
    pub fn summary(&self, classified: &[ClassifiedBill<'_>]) -> ClassificationSummary {
        let mut provision_counts: BTreeMap<String, usize> = self
            .table
            .vocabulary()
            .map(|tag| (tag.to_string(), 0))
            .collect();

        for bill in classified {
            for tag in &bill.matched_provisions {
                if let Some(count) = provision_counts.get_mut(tag) {
                    *count += 1;
                }
            }
        }

        ClassificationSummary {
            bills: classified.len(),
            with_any_provision: classified
                .iter()
                .filter(|b| !b.matched_provisions.is_empty())
                .count(),
            relevant: classified.iter().filter(|b| b.is_relevant()).count(),
            provision_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billscope_core::BillStatus;

    fn table() -> KeywordTable {
        let provisions = [
            ("age_verification", vec!["age verification", "verify age"]),
            ("transparency", vec!["transparency report"]),
            ("platform_liability", vec!["liable", "duty of care"]),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.into_iter().map(String::from).collect()))
        .collect();
        let relevance = vec!["minor".to_string(), "child".to_string(), "social media".to_string()];
        KeywordTable::new("test-v1", provisions, relevance).unwrap()
    }

    fn bill(title: &str, description: &str, themes: &[&str]) -> BillRecord {
        BillRecord {
            identifier: "Utah:HB 1".into(),
            jurisdiction: "Utah".into(),
            status: BillStatus::Passed,
            status_raw: "Passed".into(),
            title: title.into(),
            description: description.into(),
            themes: themes.iter().map(|t| t.to_string()).collect(),
            introduced_date: None,
        }
    }

    #[test]
    fn matches_single_provision() {
        let clf = TopicClassifier::new(table());
        let r = bill("", "Requires age verification for social media accounts", &[]);
        let c = clf.classify(&r);
        assert_eq!(
            c.matched_provisions.iter().collect::<Vec<_>>(),
            vec!["age_verification"]
        );
        assert!(c.relevance_hits.contains("social media"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let clf = TopicClassifier::new(table());
        let r = bill("Annual Transparency Report Requirements", "", &[]);
        let c = clf.classify(&r);
        assert!(c.matched_provisions.contains("transparency"));
    }

    #[test]
    fn matches_multiple_provisions_independently() {
        let clf = TopicClassifier::new(table());
        let r = bill(
            "Platforms to Verify Age",
            "Operators are liable for harms to a minor",
            &[],
        );
        let c = clf.classify(&r);
        assert!(c.matched_provisions.contains("age_verification"));
        assert!(c.matched_provisions.contains("platform_liability"));
        assert!(!c.matched_provisions.contains("transparency"));
    }

    #[test]
    fn themes_are_scanned() {
        let clf = TopicClassifier::new(table());
        let r = bill("Omnibus", "", &["Child Safety", "Duty of Care"]);
        let c = clf.classify(&r);
        assert!(c.matched_provisions.contains("platform_liability"));
        assert!(c.relevance_hits.contains("child"));
    }

    #[test]
    fn substring_matching_has_no_word_boundaries() {
        // "minor" inside "minority" still counts; the table owns precision.
        let clf = TopicClassifier::new(table());
        let r = bill("", "Minority business grants", &[]);
        let c = clf.classify(&r);
        assert!(c.is_relevant());
    }

    #[test]
    fn no_matches() {
        let clf = TopicClassifier::new(table());
        let r = bill("Highway Appropriations", "Road maintenance funding", &[]);
        let c = clf.classify(&r);
        assert!(c.matched_provisions.is_empty());
        assert!(!c.is_relevant());
    }

    #[test]
    fn relevance_independent_of_provisions() {
        let clf = TopicClassifier::new(table());
        let r = bill("", "Transparency report for state agencies", &[]);
        let c = clf.classify(&r);
        assert!(c.matched_provisions.contains("transparency"));
        assert!(!c.is_relevant());
    }

    #[test]
    fn classification_is_deterministic() {
        let clf = TopicClassifier::new(table());
        let r = bill("Kids Online Safety", "Duty of care; age verification for minors", &[]);
        assert_eq!(clf.classify(&r), clf.classify(&r));
    }

    #[test]
    fn batch_preserves_order_and_matches_single() {
        let clf = TopicClassifier::new(table());
        let records: Vec<BillRecord> = (0..100)
            .map(|i| {
                if i % 3 == 0 {
                    bill("", "age verification for minors", &[])
                } else {
                    bill("", "road funding", &[])
                }
            })
            .collect();

        let batch = clf.classify_batch(&records);
        assert_eq!(batch.len(), records.len());
        for (r, c) in records.iter().zip(&batch) {
            assert!(std::ptr::eq(r, c.source));
            assert_eq!(*c, clf.classify(r));
        }
    }

    #[test]
    fn summary_counts() {
        let clf = TopicClassifier::new(table());
        let records = vec![
            bill("", "age verification for minors", &[]),
            bill("", "liable operators, age verification", &[]),
            bill("", "road funding", &[]),
        ];
        let classified = clf.classify_batch(&records);
        let s = clf.summary(&classified);
        assert_eq!(s.bills, 3);
        assert_eq!(s.with_any_provision, 2);
        assert_eq!(s.relevant, 1);
        assert_eq!(s.provision_counts["age_verification"], 2);
        assert_eq!(s.provision_counts["platform_liability"], 1);
        assert_eq!(s.provision_counts["transparency"], 0);
    }
}
