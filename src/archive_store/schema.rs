//! SQLite schema for the image records database.
//!
//! Version 0 is the six-column table the original loader tooling created;
//! version 1 adds the `ocr_text` column and the filter indices. Databases
//! produced by older tooling carry no schema version tag and are detected
//! by probing for the `ocr_text` column (see the store's migration logic).

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};
use anyhow::Result;
use rusqlite::Connection;

const IMAGES_TABLE_V0: Table = Table {
    name: "images",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text),
        sqlite_column!("date", &SqlType::Text), // 4-digit year as text
        sqlite_column!("type", &SqlType::Text),
        sqlite_column!("dimension", &SqlType::Text),
        sqlite_column!("color", &SqlType::Text), // '#'-prefixed 6-hex-digit dominant color
    ],
    indices: &[],
};

const IMAGES_TABLE: Table = Table {
    name: "images",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text),
        sqlite_column!("date", &SqlType::Text),
        sqlite_column!("type", &SqlType::Text),
        sqlite_column!("dimension", &SqlType::Text),
        sqlite_column!("color", &SqlType::Text),
        sqlite_column!("ocr_text", &SqlType::Text),
    ],
    indices: &[
        ("idx_images_date", "date"),
        ("idx_images_type", "type"),
    ],
};

fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    conn.execute("ALTER TABLE images ADD COLUMN ocr_text TEXT", [])?;
    conn.execute("CREATE INDEX idx_images_date ON images(date)", [])?;
    conn.execute("CREATE INDEX idx_images_type ON images(type)", [])?;
    Ok(())
}

pub const ARCHIVE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[IMAGES_TABLE_V0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[IMAGES_TABLE],
        migration: Some(migrate_v0_to_v1),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_schema_creates_and_validates() {
        let conn = Connection::open_in_memory().unwrap();
        let schema = ARCHIVE_VERSIONED_SCHEMAS.last().unwrap();
        schema.create(&conn).unwrap();
        schema.validate(&conn).unwrap();
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let conn = Connection::open_in_memory().unwrap();
        ARCHIVE_VERSIONED_SCHEMAS.last().unwrap().create(&conn).unwrap();

        conn.execute(
            "INSERT INTO images (title, date, type, dimension, color) \
             VALUES ('Nixon', '1972', 'political-campaigns', '9cm', '#ff0000')",
            [],
        )
        .unwrap();
        let first = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO images (title, date, type, dimension, color) \
             VALUES (NULL, NULL, NULL, NULL, NULL)",
            [],
        )
        .unwrap();
        let second = conn.last_insert_rowid();

        assert!(second > first);
    }

    #[test]
    fn migration_upgrades_v0_table() {
        let conn = Connection::open_in_memory().unwrap();
        ARCHIVE_VERSIONED_SCHEMAS[0].create(&conn).unwrap();

        migrate_v0_to_v1(&conn).unwrap();
        ARCHIVE_VERSIONED_SCHEMAS[1].validate(&conn).unwrap();
    }
}
