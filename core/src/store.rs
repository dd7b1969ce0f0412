//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database. The engine hands it
//! encoded blobs; no other module executes SQL.

use crate::error::GameResult;
use crate::types::Millis;
use rusqlite::{params, Connection, OptionalExtension};

pub const AUTOSAVE_SLOT: &str = "autosave";

pub struct SaveStore {
    conn: Connection,
}

impl SaveStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: the host UI may read while an autosave writes.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self { conn };
        store.migrate_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        let store = Self { conn: Connection::open_in_memory()? };
        store.migrate_schema()?;
        Ok(store)
    }

    fn migrate_schema(&self) -> GameResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS save_slot (
                slot     TEXT PRIMARY KEY,
                saved_at INTEGER NOT NULL,
                blob     TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Upsert the blob for a slot.
    pub fn write_save(&self, slot: &str, saved_at: Millis, blob: &str) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO save_slot (slot, saved_at, blob) VALUES (?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET saved_at = ?2, blob = ?3",
            params![slot, saved_at, blob],
        )?;
        Ok(())
    }

    /// Latest blob for a slot, with its saved-at timestamp.
    pub fn read_save(&self, slot: &str) -> GameResult<Option<(Millis, String)>> {
        let row = self
            .conn
            .query_row(
                "SELECT saved_at, blob FROM save_slot WHERE slot = ?1",
                params![slot],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    pub fn delete_save(&self, slot: &str) -> GameResult<()> {
        self.conn.execute("DELETE FROM save_slot WHERE slot = ?1", params![slot])?;
        Ok(())
    }
}
