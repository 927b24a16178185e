//! Record-per-collectible store on SQLite.
//!
//! Scalar attributes get their own columns. Array-typed fields (`gallery`,
//! `estimated_value_range`, `related_subjects`, `production_status`) and the
//! local `custom_attributes` block are stored as JSON text and decoded on read.
//! Every mutation runs in its own transaction.

use super::{validate, LocalStore};
use crate::error::{KollectorError, Result};
use crate::model::{Attributes, Collectible, CustomAttributes, Images, RelatedSubject};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS collectibles (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        image_main TEXT,
        image_search TEXT,
        image_search_no_bg TEXT,
        gallery TEXT NOT NULL,
        estimated_value TEXT,
        estimated_value_range TEXT NOT NULL,
        related_subjects TEXT NOT NULL,
        production_date TEXT,
        production_status TEXT NOT NULL,
        ref_number TEXT,
        custom_attributes TEXT,
        in_collection INTEGER NOT NULL
    );
";

const COLUMNS: &str = "id, name, image_main, image_search, image_search_no_bg, gallery, \
     estimated_value, estimated_value_range, related_subjects, production_date, \
     production_status, ref_number, custom_attributes, in_collection";

/// SQLite-backed implementation of [`LocalStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        Self::init_with_connection(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::init_with_connection(Connection::open_in_memory()?)
    }

    fn init_with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| KollectorError::Store("sqlite connection lock poisoned".to_string()))
    }
}

/// A row as stored, before the JSON columns are decoded.
struct StoredRow {
    id: String,
    name: String,
    image_main: Option<String>,
    image_search: Option<String>,
    image_search_no_bg: Option<String>,
    gallery: String,
    estimated_value: Option<String>,
    estimated_value_range: String,
    related_subjects: String,
    production_date: Option<String>,
    production_status: String,
    ref_number: Option<String>,
    custom_attributes: Option<String>,
    in_collection: bool,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            image_main: row.get(2)?,
            image_search: row.get(3)?,
            image_search_no_bg: row.get(4)?,
            gallery: row.get(5)?,
            estimated_value: row.get(6)?,
            estimated_value_range: row.get(7)?,
            related_subjects: row.get(8)?,
            production_date: row.get(9)?,
            production_status: row.get(10)?,
            ref_number: row.get(11)?,
            custom_attributes: row.get(12)?,
            in_collection: row.get(13)?,
        })
    }

    fn into_collectible(self) -> Result<Collectible> {
        let id = self.id;
        let custom_attributes = match self.custom_attributes {
            Some(raw) => Some(decode_blob::<CustomAttributes>(&id, "custom_attributes", &raw)?),
            None => None,
        };

        Ok(Collectible {
            attributes: Attributes {
                name: self.name,
                images: Images {
                    main: self.image_main,
                    search: self.image_search,
                    search_no_bg: self.image_search_no_bg,
                    gallery: decode_blob(&id, "gallery", &self.gallery)?,
                },
                estimated_value: self.estimated_value,
                estimated_value_range: decode_blob(
                    &id,
                    "estimated_value_range",
                    &self.estimated_value_range,
                )?,
                related_subjects: decode_blob::<Vec<RelatedSubject>>(
                    &id,
                    "related_subjects",
                    &self.related_subjects,
                )?,
                production_date: self.production_date,
                production_status: decode_blob(&id, "production_status", &self.production_status)?,
                ref_number: self.ref_number,
            },
            custom_attributes,
            in_collection: self.in_collection,
            id,
        })
    }
}

fn encode_blob<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn decode_blob<T: DeserializeOwned>(id: &str, column: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| KollectorError::Decoding(format!("collectible {} column {}: {}", id, column, e)))
}

/// Binds every column of `item` in [`COLUMNS`] order.
fn insert_or_update(conn: &Connection, sql: &str, item: &Collectible) -> Result<usize> {
    let attrs = &item.attributes;
    let custom = item
        .custom_attributes
        .as_ref()
        .map(encode_blob)
        .transpose()?;

    let changed = conn.execute(
        sql,
        params![
            item.id,
            attrs.name,
            attrs.images.main,
            attrs.images.search,
            attrs.images.search_no_bg,
            encode_blob(&attrs.images.gallery)?,
            attrs.estimated_value,
            encode_blob(&attrs.estimated_value_range)?,
            encode_blob(&attrs.related_subjects)?,
            attrs.production_date,
            encode_blob(&attrs.production_status)?,
            attrs.ref_number,
            custom,
            item.in_collection,
        ],
    )?;
    Ok(changed)
}

impl LocalStore for SqliteStore {
    fn fetch_all(&self) -> Result<Vec<Collectible>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM collectibles ORDER BY seq", COLUMNS))?;
        let rows = stmt
            .query_map([], StoredRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(StoredRow::into_collectible).collect()
    }

    fn get(&self, id: &str) -> Result<Option<Collectible>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM collectibles WHERE id = ?1", COLUMNS),
                [id],
                StoredRow::from_row,
            )
            .optional()?;

        row.map(StoredRow::into_collectible).transpose()
    }

    fn add_many(&self, items: &[Collectible]) -> Result<usize> {
        for item in items {
            validate(item)?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let sql = format!(
            "INSERT OR IGNORE INTO collectibles ({}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            COLUMNS
        );
        let mut inserted = 0;
        for item in items {
            inserted += insert_or_update(&tx, &sql, item)?;
        }
        tx.commit()?;

        debug!(offered = items.len(), inserted, "sqlite add_many");
        Ok(inserted)
    }

    fn update(&self, item: &Collectible) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let sql = "UPDATE collectibles SET \
             name = ?2, image_main = ?3, image_search = ?4, image_search_no_bg = ?5, \
             gallery = ?6, estimated_value = ?7, estimated_value_range = ?8, \
             related_subjects = ?9, production_date = ?10, production_status = ?11, \
             ref_number = ?12, custom_attributes = ?13, in_collection = ?14 \
             WHERE id = ?1";
        let changed = insert_or_update(&tx, sql, item)?;
        tx.commit()?;

        debug!(id = %item.id, changed, "sqlite update");
        Ok(())
    }

    fn update_gallery(&self, id: &str, images: &[String]) -> Result<()> {
        let gallery = encode_blob(images)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE collectibles SET gallery = ?2 WHERE id = ?1",
            params![id, gallery],
        )?;
        tx.commit()?;

        debug!(id, changed, "sqlite update_gallery");
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let changed = tx.execute("DELETE FROM collectibles WHERE id = ?1", [id])?;
        tx.commit()?;

        debug!(id, changed, "sqlite delete");
        Ok(())
    }

    fn contains(&self, item: &Collectible) -> Result<bool> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM collectibles WHERE id = ?1)",
            [&item.id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn clear(&self) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM collectibles", [])?;
        tx.commit()?;

        debug!("sqlite cleared");
        Ok(())
    }
}
