//! Cell normalisation for tracker exports.
//!
//! The state and federal CSV exports are hand-maintained spreadsheets, so the
//! same value shows up with stray whitespace, mixed separators, and two date
//! layouts.
//!
//! # Export conventions
//!
//! - Jurisdiction: full state name ("New York"), occasionally padded or with
//!   doubled inner spaces
//! - Themes: one cell, comma-separated ("Data Privacy, Online Safety")
//! - Intro Date: day-first `dd/mm/yyyy`; newer rows use ISO `yyyy-mm-dd`

use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d"];

/// Trim a jurisdiction and collapse runs of inner whitespace.
///
/// Returns `None` for blank input.
pub fn normalize_jurisdiction(s: &str) -> Option<String> {
    let joined = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if joined.is_empty() { None } else { Some(joined) }
}

/// Split a themes cell on commas and semicolons, dropping blank entries.
pub fn split_themes(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse an intro date in either export layout.
///
/// Returns `None` for blank or unparseable input.
pub fn parse_intro_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jurisdiction_trimmed_and_collapsed() {
        assert_eq!(normalize_jurisdiction("  New   York "), Some("New York".into()));
        assert_eq!(normalize_jurisdiction("Utah"), Some("Utah".into()));
    }

    #[test]
    fn blank_jurisdiction() {
        assert_eq!(normalize_jurisdiction(""), None);
        assert_eq!(normalize_jurisdiction("   "), None);
    }

    #[test]
    fn themes_split_on_separators() {
        assert_eq!(
            split_themes("Data Privacy, Online Safety;Social Media"),
            vec!["Data Privacy", "Online Safety", "Social Media"]
        );
    }

    #[test]
    fn themes_drop_blanks() {
        assert_eq!(split_themes(" , Privacy,, "), vec!["Privacy"]);
        assert!(split_themes("").is_empty());
    }

    #[test]
    fn day_first_date() {
        assert_eq!(
            parse_intro_date("05/03/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn iso_date() {
        assert_eq!(
            parse_intro_date(" 2023-11-22 "),
            NaiveDate::from_ymd_opt(2023, 11, 22)
        );
    }

    #[test]
    fn bad_dates() {
        assert_eq!(parse_intro_date(""), None);
        assert_eq!(parse_intro_date("31/02/2024"), None);
        assert_eq!(parse_intro_date("next session"), None);
    }
}
