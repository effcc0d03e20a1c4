//! Startup accelerator: mirrors the last successfully loaded dataset into
//! a sqlite key-value table. Never the source of truth: a corrupt or
//! missing entry is a cache miss, and a network refresh always replaces
//! whatever was mirrored.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

use crate::logging::{log, obj, v_str, Domain, Level};
use crate::model::Dataset;

const SNAPSHOT_KEY: &str = "dashboard";

pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY,
                saved_at TEXT NOT NULL,
                payload TEXT NOT NULL
            );
            COMMIT;",
        )?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY,
                saved_at TEXT NOT NULL,
                payload TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    /// Replace the mirrored snapshot with this dataset.
    pub fn save(&mut self, dataset: &Dataset) -> Result<()> {
        let payload = serde_json::to_string(dataset)?;
        self.conn.execute(
            "INSERT INTO snapshots (key, saved_at, payload) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET saved_at = ?2, payload = ?3",
            params![SNAPSHOT_KEY, crate::logging::ts_now(), payload],
        )?;
        log(
            Level::Debug,
            Domain::Cache,
            "snapshot_saved",
            obj(&[("bytes", serde_json::json!(payload.len()))]),
        );
        Ok(())
    }

    /// Load the mirrored snapshot. `None` covers both absence and a corrupt
    /// payload; a bad mirror must never be fatal.
    pub fn load(&self) -> Option<Dataset> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM snapshots WHERE key = ?1",
                params![SNAPSHOT_KEY],
                |row| row.get(0),
            )
            .optional()
            .ok()
            .flatten();

        let payload = payload?;
        match serde_json::from_str::<Dataset>(&payload) {
            Ok(dataset) => Some(dataset),
            Err(e) => {
                log(
                    Level::Warn,
                    Domain::Cache,
                    "snapshot_corrupt",
                    obj(&[("error", v_str(&e.to_string()))]),
                );
                None
            }
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        self.conn
            .execute("DELETE FROM snapshots WHERE key = ?1", params![SNAPSHOT_KEY])?;
        Ok(())
    }
}
