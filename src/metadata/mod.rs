//! Metadata extraction for archived button scans.
//!
//! A catalog page describes each button with labelled lines (`TITLE`,
//! `DATE`, `EXTENT`, `SUBJECTS`). The extractor reduces that free-form text
//! to a fixed four-field tuple which doubles as the on-disk filename
//! convention: the fields joined with `_`, absent values as the `"na"`
//! sentinel. The loader later parses those filenames back with
//! [`RecordFields::from_filename_stem`], and converts sentinels to NULLs
//! with [`stored_field`] right before insertion.

use lazy_static::lazy_static;
use regex::Regex;

/// Sentinel for an absent field at extraction time.
pub const NA: &str = "na";

/// Separator joining the four fields in a filename stem.
pub const FIELD_SEPARATOR: char = '_';

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(r"TITLE\s*(.+)").unwrap();
    static ref DATE_RE: Regex = Regex::new(r"DATE\s*(\d{4})").unwrap();
    static ref EXTENT_RE: Regex = Regex::new(r"EXTENT\s*diameter:\s*([\d.]+)\s*cm").unwrap();
    static ref SUBJECTS_RE: Regex = Regex::new(r"SUBJECTS\s*(.+)").unwrap();
}

/// The four metadata fields of one archived image, in extraction form.
///
/// Values are never empty; a field that could not be extracted holds
/// [`NA`]. Whitespace inside extracted values is collapsed to hyphens so
/// the fields are safe to embed in filenames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordFields {
    pub title: String,
    pub date: String,
    pub subject: String,
    pub dimension: String,
}

/// Collapse runs of whitespace to a single hyphen, trimming the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Extract the metadata tuple from raw catalog page text.
///
/// Each field is taken from the first line following its label; only the
/// `DATE` field is constrained (a 4-digit run). The `EXTENT` diameter is
/// kept as number plus unit with whitespace removed (e.g. `"3.5cm"`).
pub fn extract_from_page_text(text: &str) -> RecordFields {
    let title = TITLE_RE
        .captures(text)
        .map(|c| collapse_whitespace(&c[1]))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NA.to_string());
    let date = DATE_RE
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| NA.to_string());
    let dimension = EXTENT_RE
        .captures(text)
        .map(|c| format!("{}cm", &c[1]))
        .unwrap_or_else(|| NA.to_string());
    let subject = SUBJECTS_RE
        .captures(text)
        .map(|c| collapse_whitespace(&c[1]))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NA.to_string());

    RecordFields {
        title,
        date,
        subject,
        dimension,
    }
}

impl RecordFields {
    /// Serialize to the filename stem convention: fields joined with `_`.
    pub fn filename_stem(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}{sep}{}",
            self.title,
            self.date,
            self.subject,
            self.dimension,
            sep = FIELD_SEPARATOR
        )
    }

    /// Parse a filename stem back into the four fields.
    ///
    /// Returns `None` when the stem has fewer than four `_`-separated
    /// tokens. Extra tokens beyond the fourth are ignored, so this
    /// round-trips with [`filename_stem`](Self::filename_stem) exactly when
    /// no field value itself contains the separator.
    pub fn from_filename_stem(stem: &str) -> Option<RecordFields> {
        let parts: Vec<&str> = stem.split(FIELD_SEPARATOR).collect();
        if parts.len() < 4 {
            return None;
        }
        Some(RecordFields {
            title: parts[0].to_string(),
            date: parts[1].to_string(),
            subject: parts[2].to_string(),
            dimension: parts[3].to_string(),
        })
    }
}

/// Storage-time normalization: the `"na"` sentinel (any case) becomes NULL.
pub fn stored_field(value: &str) -> Option<String> {
    if value.eq_ignore_ascii_case(NA) {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_TEXT: &str = "\
Political Buttons Collection
TITLE
Nixon Now campaign button
DATE
1972
EXTENT
diameter: 3.5 cm
SUBJECTS
political campaigns
elections
";

    #[test]
    fn extracts_all_fields_from_page_text() {
        let fields = extract_from_page_text(PAGE_TEXT);
        assert_eq!(fields.title, "Nixon-Now-campaign-button");
        assert_eq!(fields.date, "1972");
        assert_eq!(fields.dimension, "3.5cm");
        // Only the first line after SUBJECTS is kept.
        assert_eq!(fields.subject, "political-campaigns");
    }

    #[test]
    fn absent_labels_become_na() {
        let fields = extract_from_page_text("nothing useful here");
        assert_eq!(
            fields,
            RecordFields {
                title: NA.to_string(),
                date: NA.to_string(),
                subject: NA.to_string(),
                dimension: NA.to_string(),
            }
        );
    }

    #[test]
    fn date_requires_four_digit_run() {
        let fields = extract_from_page_text("DATE\nca. 72\n");
        assert_eq!(fields.date, NA);
        let fields = extract_from_page_text("DATE 1968");
        assert_eq!(fields.date, "1968");
    }

    #[test]
    fn whitespace_runs_collapse_to_single_hyphen() {
        let fields = extract_from_page_text("TITLE\n  Vote   for\tWillkie  \n");
        assert_eq!(fields.title, "Vote-for-Willkie");
    }

    #[test]
    fn filename_stem_round_trips() {
        let fields = extract_from_page_text(PAGE_TEXT);
        let stem = fields.filename_stem();
        assert_eq!(stem, "Nixon-Now-campaign-button_1972_political-campaigns_3.5cm");
        assert_eq!(RecordFields::from_filename_stem(&stem), Some(fields));
    }

    #[test]
    fn short_stem_is_rejected() {
        assert_eq!(RecordFields::from_filename_stem("only_three_parts"), None);
        assert_eq!(RecordFields::from_filename_stem(""), None);
    }

    #[test]
    fn stored_field_normalizes_na_case_insensitively() {
        assert_eq!(stored_field("na"), None);
        assert_eq!(stored_field("NA"), None);
        assert_eq!(stored_field("Na"), None);
        assert_eq!(stored_field("Nixon"), Some("Nixon".to_string()));
    }
}
