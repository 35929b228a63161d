pub mod models;
pub mod schema;
mod store;
mod trait_def;

pub use models::{
    ImageDisplayEntry, ImageRecord, KindFilter, NewImageRecord, RecordQuery, POLITICAL_CAMPAIGNS,
};
pub use store::SqliteArchiveStore;
pub use trait_def::ArchiveStore;
