//! Offline loading of convention-named image files into the record store.
//!
//! Each `.jpg`/`.png` directly under the archive directory is expected to
//! follow the `title_date_type_dimension` stem convention produced by the
//! scraping stage. Files that don't parse are skipped, not fatal; a file
//! whose pixels can't be decoded still gets a row, just without a color.

use crate::archive_store::{ArchiveStore, NewImageRecord};
use crate::metadata::{stored_field, RecordFields};
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Edge length the image is downscaled to before averaging pixels.
const COLOR_SAMPLE_EDGE: u32 = 64;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Derive the dominant color of an image as a `#rrggbb` string.
///
/// The mean pixel of a downscaled decode; averaging is what a single-cluster
/// clustering of the pixels converges to.
pub fn dominant_color<P: AsRef<Path>>(path: P) -> Result<String> {
    let img = image::open(path.as_ref())
        .with_context(|| format!("Failed to decode image {:?}", path.as_ref()))?;
    let thumb = img
        .thumbnail(COLOR_SAMPLE_EDGE, COLOR_SAMPLE_EDGE)
        .into_rgb8();

    let mut sums = [0u64; 3];
    let mut count = 0u64;
    for pixel in thumb.pixels() {
        sums[0] += pixel.0[0] as u64;
        sums[1] += pixel.0[1] as u64;
        sums[2] += pixel.0[2] as u64;
        count += 1;
    }
    if count == 0 {
        bail!("Image {:?} has no pixels", path.as_ref());
    }

    Ok(format!(
        "#{:02x}{:02x}{:02x}",
        sums[0] / count,
        sums[1] / count,
        sums[2] / count
    ))
}

/// Walk the archive directory and insert one record per parseable image
/// file. Returns how many rows were inserted and how many files skipped.
pub fn load_archive_dir(store: &dyn ArchiveStore, archive_dir: &Path) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();

    for entry in WalkDir::new(archive_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let Some(stem) = name
            .strip_suffix(".jpg")
            .or_else(|| name.strip_suffix(".png"))
        else {
            continue;
        };

        let Some(fields) = RecordFields::from_filename_stem(stem) else {
            warn!("Skipping {} (invalid filename format)", name);
            summary.skipped += 1;
            continue;
        };

        let color = match dominant_color(entry.path()) {
            Ok(color) => Some(color),
            Err(err) => {
                warn!("No dominant color for {}: {:#}", name, err);
                None
            }
        };

        let record = NewImageRecord {
            title: stored_field(&fields.title),
            date: stored_field(&fields.date),
            kind: stored_field(&fields.subject),
            dimension: stored_field(&fields.dimension),
            color,
            ocr_text: None,
        };
        let id = store.insert_record(&record)?;
        info!(
            "Added record {}: {} | date {} | type {} | dimension {}",
            id, fields.title, fields.date, fields.subject, fields.dimension
        );
        summary.inserted += 1;
    }

    Ok(summary)
}
