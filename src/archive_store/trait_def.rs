//! The storage seam between ingestion, the query engine and SQLite.

use super::models::{ImageRecord, NewImageRecord, RecordQuery};
use anyhow::Result;

/// A durable, append-only table of image records.
///
/// Inserts assign ids automatically and never collide; there are no update
/// or delete operations. Ingestion (writes) and serving (reads) are
/// non-overlapping phases, so implementations only need reads to reflect
/// all prior committed inserts.
pub trait ArchiveStore: Send + Sync {
    /// Insert one record and return its assigned id.
    fn insert_record(&self, record: &NewImageRecord) -> Result<i64>;

    /// Return records matching the pushdown predicates, ordered by id.
    fn query_records(&self, query: &RecordQuery) -> Result<Vec<ImageRecord>>;

    /// Total number of stored records.
    fn records_count(&self) -> usize;
}
