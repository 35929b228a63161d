//! Resolution of derived filenames to servable image URLs.
//!
//! File existence is the one side-effecting read inside an otherwise pure
//! query, so it sits behind a narrow trait that tests replace with a map.

use std::path::PathBuf;

/// Resolves a derived filename to a resource URL, or `None` when no file
/// is located for it.
pub trait ImageResolver: Send + Sync {
    fn resolve(&self, filename: &str) -> Option<String>;
}

/// Filesystem-backed resolver over the archive directory.
pub struct FsImageResolver {
    archive_dir: PathBuf,
    public_base_url: String,
}

impl FsImageResolver {
    pub fn new<P: Into<PathBuf>>(archive_dir: P, public_base_url: &str) -> Self {
        FsImageResolver {
            archive_dir: archive_dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl ImageResolver for FsImageResolver {
    fn resolve(&self, filename: &str) -> Option<String> {
        if self.archive_dir.join(filename).exists() {
            Some(format!("{}/image/{}", self.public_base_url, filename))
        } else {
            None
        }
    }
}
