//! `sqlite` store — durable note table backed by a single SQLite file.
//!
//! Layout: one table keyed by note name.
//!
//! ```text
//! notes(note_name TEXT PRIMARY KEY, note_text TEXT NOT NULL)
//! ```
//!
//! The store owns exactly one [`Connection`] behind a [`Mutex`]; every
//! operation runs to completion while holding it.  Mutations are single
//! statements whose affected-row count decides the outcome, so no second
//! handler can slip in between "does it exist" and "change it".

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::error::AppError;
use crate::subsystems::notes::store::{DeleteOutcome, NoteStore, UpdateOutcome, check_name};

/// Schema version stored in `PRAGMA user_version`.
const SCHEMA_VERSION: i64 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed [`NoteStore`].
pub struct SqliteNoteStore {
    conn: Mutex<Connection>,
}

impl SqliteNoteStore {
    /// Open (or create) the database at `db_path`, creating parent directories.
    pub fn open(db_path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Store(format!("sqlite: cannot create {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Store(format!("sqlite: open {}: {e}", db_path.display())))?;

        // WAL lets readers proceed alongside the writer.
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(|e| AppError::Store(format!("sqlite: set journal_mode WAL: {e}")))?;
        debug!(journal_mode = %mode, "sqlite journal mode");

        let store = Self::from_connection(conn)?;
        info!(path = %db_path.display(), "sqlite note store ready");
        Ok(store)
    }

    /// Private in-memory database. Useful in tests.
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Store(format!("sqlite: open in-memory: {e}")))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| AppError::Store(format!("sqlite: set busy_timeout: {e}")))?;
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::Store("sqlite store lock poisoned".into()))
    }
}

/// Create the `notes` table when `user_version` is behind [`SCHEMA_VERSION`].
///
/// `IF NOT EXISTS` keeps databases written by earlier deployments of the bot
/// (same table and column names) readable.
fn init_schema(conn: &Connection) -> Result<(), AppError> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| AppError::Store(format!("sqlite: read user_version: {e}")))?;

    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS notes (
            note_name TEXT PRIMARY KEY,
            note_text TEXT NOT NULL
        );

        PRAGMA user_version = 1;
        ",
    )
    .map_err(|e| AppError::Store(format!("sqlite: initialize schema: {e}")))
}

impl NoteStore for SqliteNoteStore {
    fn store_type(&self) -> &str {
        "sqlite"
    }

    fn save(&self, name: &str, text: &str) -> Result<(), AppError> {
        check_name(name)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO notes (note_name, note_text) VALUES (?1, ?2)
             ON CONFLICT(note_name) DO UPDATE SET note_text = excluded.note_text",
            params![name, text],
        )
        .map_err(|e| AppError::Store(format!("sqlite: save '{name}': {e}")))?;
        Ok(())
    }

    fn update_if_exists(&self, name: &str, text: &str) -> Result<UpdateOutcome, AppError> {
        check_name(name)?;
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE notes SET note_text = ?2 WHERE note_name = ?1",
                params![name, text],
            )
            .map_err(|e| AppError::Store(format!("sqlite: update '{name}': {e}")))?;
        Ok(if changed == 0 {
            UpdateOutcome::NotFound
        } else {
            UpdateOutcome::Updated
        })
    }

    fn delete_if_exists(&self, name: &str) -> Result<DeleteOutcome, AppError> {
        check_name(name)?;
        let conn = self.lock()?;
        let changed = conn
            .execute("DELETE FROM notes WHERE note_name = ?1", params![name])
            .map_err(|e| AppError::Store(format!("sqlite: delete '{name}': {e}")))?;
        Ok(if changed == 0 {
            DeleteOutcome::NotFound
        } else {
            DeleteOutcome::Deleted
        })
    }

    fn get(&self, name: &str) -> Result<Option<String>, AppError> {
        let conn = self.lock()?;
        let text: Option<Option<String>> = conn
            .query_row(
                "SELECT note_text FROM notes WHERE note_name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AppError::Store(format!("sqlite: get '{name}': {e}")))?;
        // Legacy tables allowed NULL text; surface it as an empty body.
        Ok(text.map(Option::unwrap_or_default))
    }

    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let conn = self.lock()?;
        // Bytewise substr comparison instead of LIKE: `%` and `_` stay literal
        // and the match is case-sensitive.  Compared as blobs because text
        // `length` stops at the first NUL.  BINARY collation orders UTF-8
        // bytewise, which matches `str` ordering.
        let mut stmt = conn
            .prepare(
                "SELECT note_name FROM notes
                 WHERE substr(CAST(note_name AS BLOB), 1, length(CAST(?1 AS BLOB)))
                       = CAST(?1 AS BLOB)
                 ORDER BY note_name ASC",
            )
            .map_err(|e| AppError::Store(format!("sqlite: prepare list: {e}")))?;

        let names = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))
            .map_err(|e| AppError::Store(format!("sqlite: list '{prefix}': {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Store(format!("sqlite: read list row: {e}")))?;
        Ok(names)
    }
}
