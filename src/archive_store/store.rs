//! SQLite-backed archive store implementation.
//!
//! One write connection (used by the offline loader) plus a small
//! round-robin pool of read-only connections for serving queries. The
//! schema is created or migrated on open.

use super::models::{ImageRecord, KindFilter, NewImageRecord, RecordQuery, POLITICAL_CAMPAIGNS};
use super::schema::ARCHIVE_VERSIONED_SCHEMAS;
use super::trait_def::ArchiveStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, ToSql};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

const READ_POOL_SIZE: usize = 4;

/// SQLite-backed store for archived image records.
#[derive(Clone)]
pub struct SqliteArchiveStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = ARCHIVE_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &ARCHIVE_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if table_count == 0 {
        // Brand new database - create the latest schema directly
        info!("Creating archive db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    // Databases created by the original loader tooling carry no schema
    // version tag (user_version = 0); probe for the v1 column to find
    // their effective version.
    let mut current_version = if db_version < BASE_DB_VERSION as i64 {
        let has_ocr_text = conn
            .query_row(
                "SELECT 1 FROM pragma_table_info('images') WHERE name = 'ocr_text'",
                [],
                |r| r.get::<_, i32>(0),
            )
            .ok()
            == Some(1);

        if has_ocr_text {
            1
        } else {
            0
        }
    } else {
        (db_version - BASE_DB_VERSION as i64) as usize
    };

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in ARCHIVE_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating archive db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx)?;
                current_version = schema.version;
            }
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
        tx.commit()?;
    }

    latest_schema.validate(conn)?;
    Ok(())
}

impl SqliteArchiveStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open archive database")?;

        migrate_if_needed(&mut write_conn)?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let mut read_pool = Vec::with_capacity(READ_POOL_SIZE);
        for _ in 0..READ_POOL_SIZE {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteArchiveStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn parse_record_row(row: &rusqlite::Row) -> rusqlite::Result<ImageRecord> {
        Ok(ImageRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            date: row.get(2)?,
            kind: row.get(3)?,
            dimension: row.get(4)?,
            color: row.get(5)?,
            ocr_text: row.get(6)?,
        })
    }
}

impl ArchiveStore for SqliteArchiveStore {
    fn insert_record(&self, record: &NewImageRecord) -> Result<i64> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO images (title, date, type, dimension, color, ocr_text) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.title,
                record.date,
                record.kind,
                record.dimension,
                record.color,
                record.ocr_text
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn query_records(&self, query: &RecordQuery) -> Result<Vec<ImageRecord>> {
        let mut sql = String::from(
            "SELECT id, title, date, type, dimension, color, ocr_text FROM images WHERE 1=1",
        );
        let mut bound: Vec<Box<dyn ToSql>> = Vec::new();

        // A NULL date casts to NULL and never satisfies an active bound.
        match (query.min_date, query.max_date) {
            (Some(min), Some(max)) => {
                sql.push_str(" AND CAST(date AS INTEGER) BETWEEN ? AND ?");
                bound.push(Box::new(min));
                bound.push(Box::new(max));
            }
            (Some(min), None) => {
                sql.push_str(" AND CAST(date AS INTEGER) >= ?");
                bound.push(Box::new(min));
            }
            (None, Some(max)) => {
                sql.push_str(" AND CAST(date AS INTEGER) <= ?");
                bound.push(Box::new(max));
            }
            (None, None) => {}
        }

        match &query.kind {
            Some(KindFilter::PoliticalCampaigns) => {
                sql.push_str(" AND type = ?");
                bound.push(Box::new(POLITICAL_CAMPAIGNS));
            }
            Some(KindFilter::Other) => {
                sql.push_str(" AND type != ?");
                bound.push(Box::new(POLITICAL_CAMPAIGNS));
            }
            Some(KindFilter::Exact(value)) => {
                sql.push_str(" AND type = ?");
                bound.push(Box::new(value.clone()));
            }
            None => {}
        }

        sql.push_str(" ORDER BY id");

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&sql)?;
        let param_refs: Vec<&dyn ToSql> = bound.iter().map(|p| p.as_ref()).collect();
        let records = stmt
            .query_map(param_refs.as_slice(), Self::parse_record_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn records_count(&self) -> usize {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM images", [], |r| r.get::<_, i64>(0))
            .unwrap_or(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> SqliteArchiveStore {
        SqliteArchiveStore::new(dir.path().join("images.db")).unwrap()
    }

    fn record(
        title: &str,
        date: Option<&str>,
        kind: Option<&str>,
        color: Option<&str>,
    ) -> NewImageRecord {
        NewImageRecord {
            title: Some(title.to_string()),
            date: date.map(str::to_string),
            kind: kind.map(str::to_string),
            dimension: Some("3.5cm".to_string()),
            color: color.map(str::to_string),
            ocr_text: None,
        }
    }

    #[test]
    fn insert_assigns_unique_increasing_ids() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let first = store
            .insert_record(&record("a", Some("1950"), None, None))
            .unwrap();
        let second = store
            .insert_record(&record("b", Some("1960"), None, None))
            .unwrap();
        assert!(second > first);
    }

    #[test]
    fn query_without_filters_returns_all_in_id_order() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.insert_record(&record("a", Some("1950"), None, None)).unwrap();
        store.insert_record(&record("b", None, None, None)).unwrap();

        let records = store.query_records(&RecordQuery::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].id < records[1].id);
        assert_eq!(records[0].title.as_deref(), Some("a"));
        assert_eq!(records[1].date, None);
    }

    #[test]
    fn date_bounds_are_inclusive_and_exclude_null_dates() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.insert_record(&record("old", Some("1940"), None, None)).unwrap();
        store.insert_record(&record("mid", Some("1960"), None, None)).unwrap();
        store.insert_record(&record("new", Some("1980"), None, None)).unwrap();
        store.insert_record(&record("undated", None, None, None)).unwrap();

        let range = RecordQuery {
            min_date: Some(1940),
            max_date: Some(1960),
            kind: None,
        };
        let titles: Vec<_> = store
            .query_records(&range)
            .unwrap()
            .into_iter()
            .map(|r| r.title.unwrap())
            .collect();
        assert_eq!(titles, vec!["old", "mid"]);

        let min_only = RecordQuery {
            min_date: Some(1900),
            ..Default::default()
        };
        let titles: Vec<_> = store
            .query_records(&min_only)
            .unwrap()
            .into_iter()
            .map(|r| r.title.unwrap())
            .collect();
        assert_eq!(titles, vec!["old", "mid", "new"]);

        let max_only = RecordQuery {
            max_date: Some(1950),
            ..Default::default()
        };
        assert_eq!(store.query_records(&max_only).unwrap().len(), 1);
    }

    #[test]
    fn kind_filter_semantics() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store
            .insert_record(&record("p", None, Some(POLITICAL_CAMPAIGNS), None))
            .unwrap();
        store.insert_record(&record("f", None, Some("fish"), None)).unwrap();
        store.insert_record(&record("untyped", None, None, None)).unwrap();

        let political = RecordQuery {
            kind: Some(KindFilter::PoliticalCampaigns),
            ..Default::default()
        };
        let records = store.query_records(&political).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("p"));

        // A NULL type satisfies neither side of the type comparison.
        let other = RecordQuery {
            kind: Some(KindFilter::Other),
            ..Default::default()
        };
        let records = store.query_records(&other).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("f"));

        let exact = RecordQuery {
            kind: Some(KindFilter::Exact("fish".to_string())),
            ..Default::default()
        };
        assert_eq!(store.query_records(&exact).unwrap().len(), 1);
    }

    #[test]
    fn reopens_existing_database() {
        let dir = TempDir::new().unwrap();
        let id = {
            let store = open_store(&dir);
            store
                .insert_record(&record("kept", Some("1972"), None, Some("#ff0000")))
                .unwrap()
        };

        let store = open_store(&dir);
        let records = store.query_records(&RecordQuery::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn migrates_legacy_loader_database() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("images.db");

        // Schema as created by the original loader tooling, no version tag.
        let conn = Connection::open(&db_path).unwrap();
        conn.execute(
            "CREATE TABLE images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT,
                date TEXT,
                type TEXT,
                dimension TEXT,
                color TEXT
            )",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO images (title, date, type, dimension, color) \
             VALUES ('Nixon', '1972', 'political-campaigns', '9cm', '#ff0000')",
            [],
        )
        .unwrap();
        drop(conn);

        let store = SqliteArchiveStore::new(&db_path).unwrap();
        let records = store.query_records(&RecordQuery::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("Nixon"));
        assert_eq!(records[0].ocr_text, None);
        assert_eq!(store.records_count(), 1);
    }
}
