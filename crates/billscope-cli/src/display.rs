//! Terminal summary of a statistics bundle.
//!
//! Renders the bundle as a sectioned card followed by Arrow pretty-printed
//! score and consensus tables.

use std::fmt::Write;

use arrow::util::pretty::pretty_format_batches;
use billscope_analysis::StatisticsBundle;
use billscope_core::KeywordTable;

const MAX_KEYWORD_HITS: usize = 10;

// ── Public API ──

/// Print the summary card and tables to stdout.
pub fn print_summary(bundle: &StatisticsBundle) -> anyhow::Result<()> {
    print!("{}", render_card(bundle));

    println!("Jurisdiction Scores");
    println!("{}", pretty_format_batches(&[bundle.scores_batch()?])?);
    println!();
    println!("Provision Consensus");
    println!("{}", pretty_format_batches(&[bundle.consensus_batch()?])?);
    Ok(())
}

pub fn print_keyword_table(table: &KeywordTable) {
    println!("=== {} ===", table.version());
    println!("  {:<26} {}", "fingerprint", table.fingerprint());
    println!("  {:<26} {}", "relevance keywords", table.relevance().len());
    println!();
    println!("Provisions");
    for (tag, patterns) in table.provisions() {
        println!("  {:<26} {}", tag, patterns.join(", "));
    }
}

// ── Card rendering ──

fn render_card(bundle: &StatisticsBundle) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_card(&mut out, bundle);
    out
}

fn write_card(out: &mut String, b: &StatisticsBundle) -> std::fmt::Result {
    let o = &b.overview;
    writeln!(out, "=== billscope analysis ===")?;
    writeln!(
        out,
        "keyword table {} ({})",
        b.keyword_table.version,
        short_fingerprint(&b.keyword_table.fingerprint)
    )?;
    writeln!(out)?;

    writeln!(out, "Dataset")?;
    row(out, "records loaded", o.records_loaded)?;
    row(out, "state / federal", format!("{} / {}", o.state_records, o.federal_records))?;
    row(out, "rows skipped", o.rows_skipped)?;
    row(out, "passed records", o.passed_records)?;
    row(out, "passed state records", o.passed_state_records)?;
    row(out, "analysis subset", o.subset_bills)?;
    if o.unattributed_bills > 0 {
        row(out, "no jurisdiction", o.unattributed_bills)?;
    }
    row(out, "relevance-only bills", o.relevance_only_bills)?;
    row(out, "jurisdictions scored", o.jurisdictions_scored)?;
    if let Some(range) = &o.date_range {
        row(out, "introduced", format!("{} to {}", range.start, range.end))?;
    }
    let q = &b.data_quality;
    if q.malformed_rows > 0 {
        row(out, "malformed rows", q.malformed_rows)?;
    }
    if q.unrecognized_status > 0 {
        row(out, "unrecognized statuses", q.unrecognized_status)?;
    }
    if q.unparsed_dates > 0 {
        row(out, "unparsed dates", q.unparsed_dates)?;
    }
    writeln!(out)?;

    writeln!(out, "Protection Tiers")?;
    for t in &b.tier_distribution.tiers {
        row(out, t.tier.as_str(), format!("{} ({:.1}%)", t.count, t.percentage))?;
    }
    if let Some(d) = &b.dispersion {
        row(out, "mean score", format!("{:.2}", d.mean))?;
        row(out, "std dev (population)", format!("{:.2}", d.std_dev))?;
        row(out, "range", format!("{} to {}", d.min, d.max))?;
    }
    writeln!(out)?;

    writeln!(out, "Federal vs State")?;
    row(out, "ratio", b.federal_state_ratio.display())?;
    writeln!(out)?;

    let e = &b.evidence_gaps;
    writeln!(out, "Evidence Gaps")?;
    row(
        out,
        "citing evidence",
        format!("{} of {}", e.bills_with_evidence, e.bills_examined),
    )?;
    row(out, "no evidence", format!("{:.1}%", e.evidence_gap_percentage))?;
    for c in &e.categories {
        row(out, &c.category, format!("{:.1}% gap", c.gap_percentage))?;
    }
    writeln!(out)?;

    if !b.ranking.top.is_empty() {
        writeln!(out, "Ranking")?;
        let names = |list: &[billscope_analysis::stats::RankedJurisdiction]| {
            list.iter()
                .map(|j| format!("{} ({})", j.jurisdiction, j.score))
                .collect::<Vec<_>>()
                .join(", ")
        };
        row(out, "top", names(&b.ranking.top))?;
        row(out, "bottom", names(&b.ranking.bottom))?;
        writeln!(out)?;
    }

    if !b.yearly_bills.is_empty() {
        writeln!(out, "Bills by Year")?;
        for (year, count) in &b.yearly_bills {
            row(out, &year.to_string(), count)?;
        }
        writeln!(out)?;
    }

    if !b.keyword_hits.is_empty() {
        writeln!(out, "Relevance Keywords")?;
        for hit in b.keyword_hits.iter().take(MAX_KEYWORD_HITS) {
            row(out, &hit.keyword, hit.bills)?;
        }
        if b.keyword_hits.len() > MAX_KEYWORD_HITS {
            writeln!(out, "  ... and {} more", b.keyword_hits.len() - MAX_KEYWORD_HITS)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn row(out: &mut String, label: &str, value: impl std::fmt::Display) -> std::fmt::Result {
    writeln!(out, "  {:<26} {}", label, value)
}

fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use billscope_analysis::Pipeline;
    use billscope_core::{BillRecord, BillStatus};
    use std::collections::BTreeSet;

    fn bill(jurisdiction: &str, description: &str) -> BillRecord {
        BillRecord {
            identifier: format!("{jurisdiction}:row0"),
            jurisdiction: jurisdiction.into(),
            status: BillStatus::Passed,
            status_raw: "Passed".into(),
            title: String::new(),
            description: description.into(),
            themes: BTreeSet::new(),
            introduced_date: None,
        }
    }

    fn bundle() -> StatisticsBundle {
        let records = vec![
            bill("Utah", "Age verification and parental consent for minors"),
            bill("Federal", "Kids online safety"),
        ];
        Pipeline::builtin().unwrap().run_records(&records).unwrap()
    }

    #[test]
    fn card_has_sections() {
        let card = render_card(&bundle());
        assert!(card.contains("Dataset"));
        assert!(card.contains("Protection Tiers"));
        assert!(card.contains("std dev (population)"));
        assert!(card.contains("child-online-safety-v1"));
        assert!(card.contains("Evidence Gaps"));
        assert!(card.contains("verification_efficacy"));
        assert!(!card.contains("Bills by Year"));
    }

    #[test]
    fn card_shows_ratio() {
        let card = render_card(&bundle());
        let line = card.lines().find(|l| l.trim_start().starts_with("ratio")).unwrap();
        assert!(line.ends_with("1:1"));
    }

    #[test]
    fn card_shows_state_federal_split() {
        let card = render_card(&bundle());
        let line = card
            .lines()
            .find(|l| l.trim_start().starts_with("state / federal"))
            .unwrap();
        assert!(line.ends_with("1 / 1"));
        assert!(!card.contains("no jurisdiction"));
    }

    #[test]
    fn tables_render() {
        let b = bundle();
        let scores = pretty_format_batches(&[b.scores_batch().unwrap()]).unwrap().to_string();
        assert!(scores.contains("Utah"));
        assert!(scores.contains("Federal"));
    }

    #[test]
    fn short_fingerprint_handles_short_input() {
        assert_eq!(short_fingerprint("abc"), "abc");
        assert_eq!(short_fingerprint("0123456789abcdef"), "0123456789ab");
    }
}
