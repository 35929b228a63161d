//! Models for the archived image records and their query/response shapes.

use serde::{Deserialize, Serialize};

/// The one type/subject label with dedicated filter semantics.
pub const POLITICAL_CAMPAIGNS: &str = "political-campaigns";

/// One row of the `images` table.
///
/// All metadata columns are nullable; NULL means the field could not be
/// extracted for this scan. Records are append-only: `id` is assigned on
/// insert and never changes, and rows are never updated in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: i64,
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub dimension: Option<String>,
    pub color: Option<String>,
    pub ocr_text: Option<String>,
}

/// Insert shape for a record; the store assigns the id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewImageRecord {
    pub title: Option<String>,
    pub date: Option<String>,
    pub kind: Option<String>,
    pub dimension: Option<String>,
    pub color: Option<String>,
    pub ocr_text: Option<String>,
}

/// Response shape for one record after filename derivation and
/// file-existence resolution.
///
/// `image_url` is `None` when no file was located for the record; that is
/// a valid display state, not an error. `dimension` is defaulted to the
/// `"na"` sentinel because the front end renders it unconditionally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageDisplayEntry {
    pub id: i64,
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub dimension: String,
    pub color: Option<String>,
    pub image_url: Option<String>,
}

/// Type/subject filter semantics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KindFilter {
    /// Keep only records whose type is exactly `political-campaigns`.
    PoliticalCampaigns,
    /// Keep all records whose type is NOT `political-campaigns`.
    Other,
    /// Exact match on any other type label.
    Exact(String),
}

impl KindFilter {
    /// Parse the `type` query parameter into filter semantics.
    pub fn from_param(value: &str) -> KindFilter {
        match value {
            POLITICAL_CAMPAIGNS => KindFilter::PoliticalCampaigns,
            "other" => KindFilter::Other,
            other => KindFilter::Exact(other.to_string()),
        }
    }
}

/// The pushdown-safe portion of the gallery filters: simple range and
/// equality predicates the store compiles into SQL.
///
/// `None` always means "no constraint". Records with a NULL `date` never
/// satisfy an active date bound.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordQuery {
    pub min_date: Option<i64>,
    pub max_date: Option<i64>,
    pub kind: Option<KindFilter>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_filter_recognizes_special_labels() {
        assert_eq!(
            KindFilter::from_param("political-campaigns"),
            KindFilter::PoliticalCampaigns
        );
        assert_eq!(KindFilter::from_param("other"), KindFilter::Other);
        assert_eq!(
            KindFilter::from_param("fish"),
            KindFilter::Exact("fish".to_string())
        );
    }

    #[test]
    fn record_serializes_type_field_name() {
        let record = ImageRecord {
            id: 1,
            title: None,
            date: None,
            kind: Some(POLITICAL_CAMPAIGNS.to_string()),
            dimension: None,
            color: None,
            ocr_text: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "political-campaigns");
        assert!(json.get("kind").is_none());
    }
}
