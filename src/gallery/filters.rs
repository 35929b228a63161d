//! Gallery filter configuration.
//!
//! Every field's absence has defined semantics; no combination of filters
//! is ever rejected.

use crate::archive_store::{KindFilter, RecordQuery};

/// Default maximum circular hue distance, in degrees, for a record to
/// match a color filter.
pub const DEFAULT_HUE_TOLERANCE: f64 = 10.0;

/// Filters recognized by [`Gallery::find`](super::Gallery::find).
///
/// - `min_date` / `max_date`: inclusive bounds on the numeric
///   interpretation of `date`; one-sided when only one is present.
///   Ignored entirely when `apply_date` is false. Records without a date
///   never satisfy an active bound.
/// - `kind`: type/subject filter, see [`KindFilter`].
/// - `color` + `hue_tolerance`: keep records whose stored color's hue lies
///   within `hue_tolerance` degrees (circular, inclusive) of the selected
///   color's hue. Records without a stored color are dropped while a color
///   filter is active. A malformed color degrades to neutral HSL and still
///   filters, it never errors.
#[derive(Clone, Debug)]
pub struct GalleryFilters {
    pub min_date: Option<i64>,
    pub max_date: Option<i64>,
    pub apply_date: bool,
    pub kind: Option<KindFilter>,
    pub color: Option<String>,
    pub hue_tolerance: f64,
}

impl Default for GalleryFilters {
    fn default() -> Self {
        GalleryFilters {
            min_date: None,
            max_date: None,
            apply_date: true,
            kind: None,
            color: None,
            hue_tolerance: DEFAULT_HUE_TOLERANCE,
        }
    }
}

impl GalleryFilters {
    /// The pushdown-safe part of the filters, for the storage layer.
    pub fn record_query(&self) -> RecordQuery {
        RecordQuery {
            min_date: if self.apply_date { self.min_date } else { None },
            max_date: if self.apply_date { self.max_date } else { None },
            kind: self.kind.clone(),
        }
    }
}
