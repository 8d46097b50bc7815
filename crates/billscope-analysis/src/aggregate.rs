//! Per-jurisdiction provision aggregation.
//!
//! Groups the analysis subset by jurisdiction and scores each jurisdiction by
//! the number of distinct provisions enacted across its bills. Jurisdictions
//! with no subset bills do not appear at all.

use std::collections::{BTreeMap, BTreeSet};

use billscope_classify::AnalysisSubset;
use billscope_core::KeywordTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AnalysisConfig, TierThresholds};

/// Example bill titles kept per jurisdiction and provision.
pub const EXAMPLE_LAWS_PER_PROVISION: usize = 3;

/// Protection tier of a jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Low, Tier::Medium, Tier::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Provision score for one jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionScore {
    pub jurisdiction: String,
    /// Subset bills from this jurisdiction.
    pub bill_count: usize,
    pub provisions_present: BTreeSet<String>,
    /// Always `provisions_present.len()`.
    pub score: u32,
    pub tier: Tier,
    /// provision → up to [`EXAMPLE_LAWS_PER_PROVISION`] bill titles enacting
    /// it, alphabetical. Bills without a title are listed by identifier.
    #[serde(default)]
    pub example_laws: BTreeMap<String, Vec<String>>,
}

impl JurisdictionScore {
    /// Derive score and tier from the provision set.
    pub fn new(
        jurisdiction: impl Into<String>,
        bill_count: usize,
        provisions_present: BTreeSet<String>,
        tiers: &TierThresholds,
    ) -> Self {
        let score = provisions_present.len() as u32;
        Self {
            jurisdiction: jurisdiction.into(),
            bill_count,
            provisions_present,
            score,
            tier: tiers.tier(score),
            example_laws: BTreeMap::new(),
        }
    }
}

/// Score every jurisdiction present in the subset, sorted by name.
///
/// Only tags in the table's provision vocabulary count toward a score;
/// relevance hits never do. With `score_federal` off, the federal
/// jurisdiction is left out.
pub fn aggregate(
    subset: &AnalysisSubset<'_>,
    table: &KeywordTable,
    config: &AnalysisConfig,
) -> Vec<JurisdictionScore> {
    let vocabulary: BTreeSet<&str> = table.vocabulary().collect();
    let mut groups: BTreeMap<&str, Group<'_>> = BTreeMap::new();

    for bill in subset.iter() {
        if !config.score_federal && bill.source.is_federal(&config.federal_label) {
            continue;
        }
        let group = groups
            .entry(bill.source.jurisdiction.as_str())
            .or_default();
        group.bills += 1;
        let label = match bill.source.title.trim() {
            "" => bill.source.identifier.as_str(),
            title => title,
        };
        for tag in bill
            .matched_provisions
            .iter()
            .filter(|tag| vocabulary.contains(tag.as_str()))
        {
            group.examples.entry(tag.as_str()).or_default().insert(label);
        }
    }

    let scores: Vec<JurisdictionScore> = groups
        .into_iter()
        .map(|(jurisdiction, group)| {
            let provisions = group.examples.keys().map(|tag| tag.to_string()).collect();
            let mut score =
                JurisdictionScore::new(jurisdiction, group.bills, provisions, &config.tiers);
            score.example_laws = group
                .examples
                .into_iter()
                .map(|(tag, labels)| {
                    let examples = labels
                        .into_iter()
                        .take(EXAMPLE_LAWS_PER_PROVISION)
                        .map(str::to_string)
                        .collect();
                    (tag.to_string(), examples)
                })
                .collect();
            score
        })
        .collect();

    debug!(jurisdictions = scores.len(), "aggregated jurisdiction scores");
    scores
}

#[derive(Default)]
struct Group<'a> {
    bills: usize,
    /// Vocabulary tag → labels of the bills matching it.
    examples: BTreeMap<&'a str, BTreeSet<&'a str>>,
}
