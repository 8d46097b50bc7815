//! Summary statistics over jurisdiction scores and the analysis subset.
//!
//! Every function here is pure and order-independent: inputs are either
//! sorted by jurisdiction already or reduced through sorted maps, and float
//! sums run over integer totals so the results are bit-identical across runs.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use billscope_classify::{AnalysisSubset, ClassifiedBill};
use billscope_core::{BillRecord, KeywordTable, UNKNOWN_JURISDICTION};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::aggregate::{JurisdictionScore, Tier};

/// Adoption rate at or above which a provision has high consensus.
pub const HIGH_CONSENSUS: f64 = 0.50;
/// Adoption rate at or above which a provision has moderate consensus.
pub const MODERATE_CONSENSUS: f64 = 0.25;

// ── Tier distribution ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCount {
    pub tier: Tier,
    pub count: usize,
    /// Share of jurisdictions in this tier, 0–100.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub total_jurisdictions: usize,
    /// One entry per tier, Low → High.
    pub tiers: Vec<TierCount>,
}

impl TierDistribution {
    pub fn count(&self, tier: Tier) -> usize {
        self.tiers
            .iter()
            .find(|t| t.tier == tier)
            .map_or(0, |t| t.count)
    }
}

pub fn tier_distribution(scores: &[JurisdictionScore]) -> TierDistribution {
    let total = scores.len();
    let tiers = Tier::ALL
        .iter()
        .map(|&tier| {
            let count = scores.iter().filter(|s| s.tier == tier).count();
            TierCount {
                tier,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();
    TierDistribution {
        total_jurisdictions: total,
        tiers,
    }
}

// ── Dispersion ──

/// Standard deviation convention used for the dispersion index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdDevConvention {
    /// Divide by N.
    Population,
}

/// Geographic inequity index: spread of provision scores across jurisdictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispersionIndex {
    pub convention: StdDevConvention,
    pub jurisdictions: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// `std_dev / mean`; `None` when the mean is zero.
    pub coefficient_of_variation: Option<f64>,
    pub min: u32,
    pub max: u32,
}

/// Population standard deviation of scores. `None` for an empty slice.
pub fn dispersion_index(scores: &[JurisdictionScore]) -> Option<DispersionIndex> {
    if scores.is_empty() {
        return None;
    }
    let n = scores.len() as f64;
    let sum: u64 = scores.iter().map(|s| u64::from(s.score)).sum();
    let mean = sum as f64 / n;
    let variance = scores
        .iter()
        .map(|s| {
            let d = f64::from(s.score) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    Some(DispersionIndex {
        convention: StdDevConvention::Population,
        jurisdictions: scores.len(),
        mean,
        std_dev,
        coefficient_of_variation: (mean > 0.0).then(|| std_dev / mean),
        min: scores.iter().map(|s| s.score).min().unwrap_or(0),
        max: scores.iter().map(|s| s.score).max().unwrap_or(0),
    })
}

// ── Consensus ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusLevel {
    High,
    Moderate,
    Low,
}

impl ConsensusLevel {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= HIGH_CONSENSUS {
            Self::High
        } else if rate >= MODERATE_CONSENSUS {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionConsensus {
    pub provision: String,
    pub adopting_jurisdictions: usize,
    pub total_jurisdictions: usize,
    /// `adopting_jurisdictions / total_jurisdictions`, in `[0, 1]`.
    pub adoption_rate: f64,
    pub consensus_level: ConsensusLevel,
    /// Adopting jurisdictions, sorted.
    pub jurisdictions: Vec<String>,
}

/// Adoption of every vocabulary provision, highest rate first.
///
/// Ties are broken by provision tag so the order is stable.
pub fn provision_consensus(
    scores: &[JurisdictionScore],
    table: &KeywordTable,
) -> Vec<ProvisionConsensus> {
    let total = scores.len();
    let mut consensus: Vec<ProvisionConsensus> = table
        .vocabulary()
        .map(|tag| {
            let mut jurisdictions: Vec<String> = scores
                .iter()
                .filter(|s| s.provisions_present.contains(tag))
                .map(|s| s.jurisdiction.clone())
                .collect();
            jurisdictions.sort();
            let adopting = jurisdictions.len();
            let rate = if total == 0 {
                0.0
            } else {
                adopting as f64 / total as f64
            };
            ProvisionConsensus {
                provision: tag.to_string(),
                adopting_jurisdictions: adopting,
                total_jurisdictions: total,
                adoption_rate: rate,
                consensus_level: ConsensusLevel::from_rate(rate),
                jurisdictions,
            }
        })
        .collect();

    // Rates share a denominator, so ordering by count is exact.
    consensus.sort_by(|a, b| {
        b.adopting_jurisdictions
            .cmp(&a.adopting_jurisdictions)
            .then_with(|| a.provision.cmp(&b.provision))
    });
    consensus
}

// ── Federal vs state ──

/// Ratio of state to federal bills in the analysis subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FederalStateRatio {
    Defined {
        state_bills: usize,
        federal_bills: usize,
        ratio: f64,
        /// `ratio` rounded to the nearest integer, read as `rounded:1`.
        rounded: u64,
    },
    /// No federal bills in the subset; the ratio has no value.
    Undefined { state_bills: usize },
}

impl FederalStateRatio {
    pub fn from_counts(state_bills: usize, federal_bills: usize) -> Self {
        if federal_bills == 0 {
            return Self::Undefined { state_bills };
        }
        let ratio = state_bills as f64 / federal_bills as f64;
        Self::Defined {
            state_bills,
            federal_bills,
            ratio,
            rounded: ratio.round() as u64,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined { .. })
    }

    /// `"50:1"`, or `"undefined"`.
    pub fn display(&self) -> String {
        match self {
            Self::Defined { rounded, .. } => format!("{rounded}:1"),
            Self::Undefined { .. } => "undefined".to_string(),
        }
    }
}

pub fn federal_state_ratio(subset: &AnalysisSubset<'_>, federal_label: &str) -> FederalStateRatio {
    let federal = subset
        .iter()
        .filter(|b| b.source.is_federal(federal_label))
        .count();
    FederalStateRatio::from_counts(subset.bills.len().saturating_sub(federal), federal)
}

// ── Subset profiles ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// ISO `YYYY-MM-DD`.
    pub start: String,
    pub end: String,
}

/// Earliest and latest introduced dates in the subset.
pub fn date_range(subset: &AnalysisSubset<'_>) -> Option<DateRange> {
    let dates = subset.iter().filter_map(|b| b.source.introduced_date);
    let (min, max) = dates.fold(None, |acc, d| match acc {
        None => Some((d, d)),
        Some((lo, hi)) => Some((d.min(lo), d.max(hi))),
    })?;
    Some(DateRange {
        start: min.format("%Y-%m-%d").to_string(),
        end: max.format("%Y-%m-%d").to_string(),
    })
}

/// Subset bills per introduced year. Bills without a date are not counted.
pub fn yearly_bills(subset: &AnalysisSubset<'_>) -> BTreeMap<i32, usize> {
    let mut years = BTreeMap::new();
    for date in subset.iter().filter_map(|b| b.source.introduced_date) {
        *years.entry(date.year()).or_insert(0) += 1;
    }
    years
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordHit {
    pub keyword: String,
    pub bills: usize,
}

/// Subset bills matching each relevance keyword, most frequent first.
///
/// Keywords with no hits are omitted.
pub fn relevance_keyword_hits(subset: &AnalysisSubset<'_>) -> Vec<KeywordHit> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for bill in subset.iter() {
        for keyword in &bill.relevance_hits {
            *counts.entry(keyword.as_str()).or_insert(0) += 1;
        }
    }
    let mut hits: Vec<KeywordHit> = counts
        .into_iter()
        .map(|(keyword, bills)| KeywordHit {
            keyword: keyword.to_string(),
            bills,
        })
        .collect();
    hits.sort_by(|a, b| b.bills.cmp(&a.bills).then_with(|| a.keyword.cmp(&b.keyword)));
    hits
}

/// Subset bills that matched relevance keywords but no provision.
pub fn relevance_only_bills(subset: &AnalysisSubset<'_>) -> usize {
    subset
        .iter()
        .filter(|b| b.matched_provisions.is_empty())
        .count()
}

// ── Ranking ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedJurisdiction {
    pub jurisdiction: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    /// Highest scores first.
    pub top: Vec<RankedJurisdiction>,
    /// Lowest scores first.
    pub bottom: Vec<RankedJurisdiction>,
}

/// Top and bottom `n` jurisdictions by score; ties ordered by name.
pub fn ranking(scores: &[JurisdictionScore], n: usize) -> Ranking {
    let rank = |cmp: fn(&JurisdictionScore, &JurisdictionScore) -> Ordering| -> Vec<RankedJurisdiction> {
        let mut sorted: Vec<&JurisdictionScore> = scores.iter().collect();
        sorted.sort_by(|a, b| cmp(a, b).then_with(|| a.jurisdiction.cmp(&b.jurisdiction)));
        sorted
            .into_iter()
            .take(n)
            .map(|s| RankedJurisdiction {
                jurisdiction: s.jurisdiction.clone(),
                score: s.score,
            })
            .collect()
    };
    Ranking {
        top: rank(|a, b| b.score.cmp(&a.score)),
        bottom: rank(|a, b| a.score.cmp(&b.score)),
    }
}

// ── Evidence gaps ──

/// Phrases in a bill description that cite supporting evidence, by category.
pub const EVIDENCE_CATEGORIES: [(&str, &[&str]); 4] = [
    (
        "privacy_data",
        &["study", "research", "data show", "evidence", "analysis"],
    ),
    ("impact_data", &["efficacy", "effectiveness", "outcome", "result"]),
    ("cost_data", &["cost", "economic impact", "fiscal", "budget"]),
    (
        "verification_efficacy",
        &["verification accuracy", "false positive"],
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceCategory {
    pub category: String,
    pub bills_with_evidence: usize,
    /// Share of examined bills citing nothing in this category, 0–100.
    pub gap_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceGaps {
    pub bills_examined: usize,
    /// Bills citing at least one category.
    pub bills_with_evidence: usize,
    pub evidence_gap_percentage: f64,
    /// In [`EVIDENCE_CATEGORIES`] order.
    pub categories: Vec<EvidenceCategory>,
}

/// Scan every subset bill's description for evidence phrases.
pub fn evidence_gaps(subset: &AnalysisSubset<'_>) -> EvidenceGaps {
    let mut per_category = [0usize; EVIDENCE_CATEGORIES.len()];
    let mut with_evidence = 0;

    for bill in subset.iter() {
        let text = bill.source.description.to_lowercase();
        let mut any = false;
        for (count, (_, phrases)) in per_category.iter_mut().zip(EVIDENCE_CATEGORIES.iter()) {
            if phrases.iter().any(|p| text.contains(p)) {
                *count += 1;
                any = true;
            }
        }
        with_evidence += usize::from(any);
    }

    let examined = subset.bills.len();
    EvidenceGaps {
        bills_examined: examined,
        bills_with_evidence: with_evidence,
        evidence_gap_percentage: 100.0 - percentage(with_evidence, examined),
        categories: EVIDENCE_CATEGORIES
            .iter()
            .zip(per_category)
            .map(|((category, _), count)| EvidenceCategory {
                category: category.to_string(),
                bills_with_evidence: count,
                gap_percentage: 100.0 - percentage(count, examined),
            })
            .collect(),
    }
}

// ── Relevant-bill activity ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    /// Normalised status name.
    pub status: String,
    pub bills: usize,
    pub percentage: f64,
}

/// Status mix of every relevant bill, whatever its status. Most frequent first.
pub fn status_distribution(classified: &[ClassifiedBill<'_>]) -> Vec<StatusCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for bill in classified.iter().filter(|b| b.is_relevant()) {
        *counts.entry(bill.source.status.as_str()).or_insert(0) += 1;
    }
    let total: usize = counts.values().sum();
    let mut statuses: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, bills)| StatusCount {
            status: status.to_string(),
            bills,
            percentage: percentage(bills, total),
        })
        .collect();
    statuses.sort_by(|a, b| b.bills.cmp(&a.bills).then_with(|| a.status.cmp(&b.status)));
    statuses
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionActivity {
    pub jurisdiction: String,
    /// Relevant bills in any status.
    pub relevant_bills: usize,
    pub passed_bills: usize,
    /// `passed_bills / relevant_bills`, 0–100.
    pub pass_rate: f64,
}

/// Relevant bills and pass rate per jurisdiction, busiest first.
///
/// Bills without a known jurisdiction are not attributed anywhere.
pub fn jurisdiction_activity(classified: &[ClassifiedBill<'_>]) -> Vec<JurisdictionActivity> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for bill in classified.iter().filter(|b| b.is_relevant()) {
        let jurisdiction = bill.source.jurisdiction.as_str();
        if jurisdiction == UNKNOWN_JURISDICTION {
            continue;
        }
        let entry = groups.entry(jurisdiction).or_default();
        entry.0 += 1;
        entry.1 += usize::from(bill.source.status.is_passed());
    }
    let mut activity: Vec<JurisdictionActivity> = groups
        .into_iter()
        .map(|(jurisdiction, (relevant, passed))| JurisdictionActivity {
            jurisdiction: jurisdiction.to_string(),
            relevant_bills: relevant,
            passed_bills: passed,
            pass_rate: percentage(passed, relevant),
        })
        .collect();
    activity.sort_by(|a, b| {
        b.relevant_bills
            .cmp(&a.relevant_bills)
            .then_with(|| a.jurisdiction.cmp(&b.jurisdiction))
    });
    activity
}

/// Non-federal records per introduced year, over the whole dataset.
pub fn state_introductions_by_year(
    records: &[BillRecord],
    federal_label: &str,
) -> BTreeMap<i32, usize> {
    let mut years = BTreeMap::new();
    for date in records
        .iter()
        .filter(|r| !r.is_federal(federal_label))
        .filter_map(|r| r.introduced_date)
    {
        *years.entry(date.year()).or_insert(0) += 1;
    }
    years
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
