//! The gallery query engine.
//!
//! Date and type predicates are pushed down to the store; each retained
//! record is then resolved to a display entry (derived filename plus
//! existence-checked URL), and a color filter, when active, runs as a
//! final stable in-memory pass over the assembled entries.

use super::filters::GalleryFilters;
use super::resolver::ImageResolver;
use crate::archive_store::{ArchiveStore, ImageDisplayEntry, ImageRecord};
use crate::color::{hex_to_hsl, hue_distance, normalize_hex};
use crate::metadata::NA;
use anyhow::Result;
use std::sync::Arc;

/// Extension appended to derived display filenames.
pub const IMAGE_EXTENSION: &str = ".jpg";

pub struct Gallery {
    store: Arc<dyn ArchiveStore>,
    resolver: Arc<dyn ImageResolver>,
}

impl Gallery {
    pub fn new(store: Arc<dyn ArchiveStore>, resolver: Arc<dyn ImageResolver>) -> Self {
        Gallery { store, resolver }
    }

    /// Find display entries matching the filters, in stored (id) order.
    pub fn find(&self, filters: &GalleryFilters) -> Result<Vec<ImageDisplayEntry>> {
        let records = self.store.query_records(&filters.record_query())?;
        let mut entries: Vec<ImageDisplayEntry> =
            records.into_iter().map(|r| self.display_entry(r)).collect();

        if let Some(color) = &filters.color {
            let selected_hue = hex_to_hsl(&normalize_hex(color)).hue;
            // Stable filter: relative order of survivors is preserved.
            entries.retain(|entry| match &entry.color {
                Some(stored) => {
                    hue_distance(hex_to_hsl(stored).hue, selected_hue) <= filters.hue_tolerance
                }
                None => false,
            });
        }

        Ok(entries)
    }

    /// Derive the display filename for a record: the four metadata fields
    /// (defaulted to `"na"` when unknown) joined with underscores, spaces
    /// replaced with hyphens, plus the image extension.
    pub fn display_filename(record: &ImageRecord) -> String {
        let field = |value: &Option<String>| value.clone().unwrap_or_else(|| NA.to_string());
        format!(
            "{}_{}_{}_{}{}",
            field(&record.title),
            field(&record.date),
            field(&record.kind),
            field(&record.dimension),
            IMAGE_EXTENSION
        )
        .replace(' ', "-")
    }

    fn display_entry(&self, record: ImageRecord) -> ImageDisplayEntry {
        let filename = Self::display_filename(&record);
        let image_url = self.resolver.resolve(&filename);
        ImageDisplayEntry {
            id: record.id,
            title: record.title,
            date: record.date,
            kind: record.kind,
            dimension: record.dimension.unwrap_or_else(|| NA.to_string()),
            color: record.color,
            image_url,
        }
    }
}
