pub mod engine;
pub mod filters;
pub mod resolver;

pub use engine::Gallery;
pub use filters::{GalleryFilters, DEFAULT_HUE_TOLERANCE};
pub use resolver::{FsImageResolver, ImageResolver};
