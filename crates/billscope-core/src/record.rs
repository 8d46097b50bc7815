//! Bill records as loaded from the legislative tracker exports.

use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Jurisdiction label used for Congress in the tracker exports.
pub const FEDERAL_JURISDICTION: &str = "Federal";

/// Placeholder jurisdiction for rows that carry a status but no state.
pub const UNKNOWN_JURISDICTION: &str = "Unknown";

/// Legislative status of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BillStatus {
    Introduced,
    Passed,
    Failed,
    Engrossed,
    Enrolled,
    Vetoed,
    Other,
}

impl BillStatus {
    /// Parse a tracker status cell.
    ///
    /// Matching is case-insensitive on the trimmed value. The federal export
    /// reports enacted bills as "Enacted", "Became Law", or "Signed"; those
    /// count as `Passed`. Returns `None` for anything unrecognised; callers
    /// map that to [`BillStatus::Other`].
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        let status = match lower.as_str() {
            "introduced" => Self::Introduced,
            "passed" | "enacted" | "became law" | "signed" => Self::Passed,
            "failed" => Self::Failed,
            "engrossed" => Self::Engrossed,
            "enrolled" => Self::Enrolled,
            "vetoed" => Self::Vetoed,
            "other" => Self::Other,
            _ => return None,
        };
        Some(status)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Introduced => "introduced",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Engrossed => "engrossed",
            Self::Enrolled => "enrolled",
            Self::Vetoed => "vetoed",
            Self::Other => "other",
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// A single bill row after field coercion.
///
/// `jurisdiction` is never empty. Text fields are empty strings when the
/// source cell was missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillRecord {
    /// `"<jurisdiction>:<bill number>"`, or `"<jurisdiction>:row<N>"` when the
    /// export has no bill number. Not used for any statistic.
    pub identifier: String,
    pub jurisdiction: String,
    pub status: BillStatus,
    /// Status text as it appeared in the export.
    pub status_raw: String,
    pub title: String,
    pub description: String,
    pub themes: BTreeSet<String>,
    pub introduced_date: Option<NaiveDate>,
}

impl BillRecord {
    /// Lowercased `title`, `description`, and themes joined by spaces.
    ///
    /// This is the text every keyword pattern is matched against.
    pub fn scan_text(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len()
                + self.description.len()
                + self.themes.iter().map(|t| t.len() + 1).sum::<usize>()
                + 2,
        );
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.description);
        for theme in &self.themes {
            text.push(' ');
            text.push_str(theme);
        }
        text.to_lowercase()
    }

    /// Whether this bill belongs to the federal jurisdiction `federal_label`.
    pub fn is_federal(&self, federal_label: &str) -> bool {
        self.jurisdiction.eq_ignore_ascii_case(federal_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, description: &str, themes: &[&str]) -> BillRecord {
        BillRecord {
            identifier: "Utah:SB 152".into(),
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
    fn parse_canonical_statuses() {
        assert_eq!(BillStatus::parse("Passed"), Some(BillStatus::Passed));
        assert_eq!(BillStatus::parse("introduced"), Some(BillStatus::Introduced));
        assert_eq!(BillStatus::parse("VETOED"), Some(BillStatus::Vetoed));
        assert_eq!(BillStatus::parse("  Enrolled "), Some(BillStatus::Enrolled));
    }

    #[test]
    fn parse_federal_aliases_as_passed() {
        assert_eq!(BillStatus::parse("Enacted"), Some(BillStatus::Passed));
        assert_eq!(BillStatus::parse("Became Law"), Some(BillStatus::Passed));
    }

    #[test]
    fn parse_unknown_status() {
        assert_eq!(BillStatus::parse("Pending in committee"), None);
        assert_eq!(BillStatus::parse(""), None);
    }

    #[test]
    fn only_passed_is_passed() {
        assert!(BillStatus::Passed.is_passed());
        assert!(!BillStatus::Enrolled.is_passed());
        assert!(!BillStatus::Other.is_passed());
    }

    #[test]
    fn scan_text_joins_and_lowercases() {
        let r = record("Age Verification Act", "Requires AGE checks", &["Online Safety"]);
        assert_eq!(r.scan_text(), "age verification act requires age checks online safety");
    }

    #[test]
    fn scan_text_with_empty_fields() {
        let r = record("", "", &[]);
        assert_eq!(r.scan_text(), " ");
    }

    #[test]
    fn federal_match_ignores_case() {
        let mut r = record("", "", &[]);
        r.jurisdiction = "FEDERAL".into();
        assert!(r.is_federal(FEDERAL_JURISDICTION));
        r.jurisdiction = "Utah".into();
        assert!(!r.is_federal(FEDERAL_JURISDICTION));
    }
}
