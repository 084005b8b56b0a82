//! SQLite-backed `ConfigurationKeyStore`. Opens (or creates) a single file
//! and serializes access behind a `Mutex`, the way the teacher's
//! `db::connection` module opens its event database (§4.9).

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use device_model_types::{ConfigurationKeyEntry, ConfigurationKeyOpts, ConfigurationKeyStore, StoreError};
use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS configuration_key (
    key      TEXT PRIMARY KEY COLLATE NOCASE,
    value    TEXT NOT NULL,
    readonly INTEGER NOT NULL,
    visible  INTEGER NOT NULL,
    reboot   INTEGER NOT NULL
);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if absent) the database at `path` and applies the
    /// schema. WAL journaling mirrors the teacher's connection setup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|source| io_or_sqlite(&path, source))?;
        conn.pragma_update(None, "journal_mode", "WAL").map_err(StoreError::from)?;
        conn.execute_batch(SCHEMA).map_err(StoreError::from)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// In-process, non-persisted database — convenient for tests that
    /// still want to exercise the real SQL, not the `MemoryStore` stand-in.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        conn.execute_batch(SCHEMA).map_err(StoreError::from)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

fn io_or_sqlite(path: &Path, source: rusqlite::Error) -> StoreError {
    match source {
        rusqlite::Error::SqliteFailure(_, _) => StoreError::Sqlite(source),
        other => StoreError::Io { path: path.to_path_buf(), source: std::io::Error::new(std::io::ErrorKind::Other, other) },
    }
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<ConfigurationKeyEntry> {
    Ok(ConfigurationKeyEntry {
        key: row.get(0)?,
        value: row.get(1)?,
        readonly: row.get::<_, i64>(2)? != 0,
        visible: row.get::<_, i64>(3)? != 0,
        reboot: row.get::<_, i64>(4)? != 0,
    })
}

impl ConfigurationKeyStore for SqliteStore {
    fn get(&self, key_name: &str) -> Result<Option<ConfigurationKeyEntry>, StoreError> {
        let conn = self.conn.lock().expect("sqlite connection lock poisoned");
        let entry = conn
            .query_row(
                "SELECT key, value, readonly, visible, reboot FROM configuration_key WHERE key = ?1",
                params![key_name],
                row_to_entry,
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(entry)
    }

    fn add(
        &self,
        key_name: &str,
        value: &str,
        opts: ConfigurationKeyOpts,
        overwrite: bool,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("sqlite connection lock poisoned");
        let sql = if overwrite {
            "INSERT INTO configuration_key (key, value, readonly, visible, reboot) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, readonly = excluded.readonly, visible = excluded.visible, reboot = excluded.reboot"
        } else {
            "INSERT OR IGNORE INTO configuration_key (key, value, readonly, visible, reboot) VALUES (?1, ?2, ?3, ?4, ?5)"
        };
        conn.execute(sql, params![key_name, value, opts.readonly as i64, opts.visible as i64, opts.reboot as i64])
            .map_err(StoreError::from)?;
        Ok(())
    }

    fn set_value(&self, key_name: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("sqlite connection lock poisoned");
        let changed = conn
            .execute("UPDATE configuration_key SET value = ?1 WHERE key = ?2", params![value, key_name])
            .map_err(StoreError::from)?;
        if changed == 0 {
            conn.execute(
                "INSERT INTO configuration_key (key, value, readonly, visible, reboot) VALUES (?1, ?2, 0, 1, 0)",
                params![key_name, value],
            )
            .map_err(StoreError::from)?;
        }
        Ok(())
    }

    fn visible_entries(&self) -> Result<Vec<ConfigurationKeyEntry>, StoreError> {
        let conn = self.conn.lock().expect("sqlite connection lock poisoned");
        let mut stmt = conn
            .prepare("SELECT key, value, readonly, visible, reboot FROM configuration_key WHERE visible = 1")
            .map_err(StoreError::from)?;
        let rows = stmt.query_map([], row_to_entry).map_err(StoreError::from)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(StoreError::from)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_get_is_case_insensitive() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add("HeartbeatInterval", "60", ConfigurationKeyOpts::default(), true).unwrap();
        let got = store.get("heartbeatinterval").unwrap().expect("must exist");
        assert_eq!(got.value, "60");
    }

    #[test]
    fn add_without_overwrite_is_a_no_op_when_present() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add("k", "1", ConfigurationKeyOpts::default(), true).unwrap();
        store.add("k", "2", ConfigurationKeyOpts::default(), false).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap().value, "1");
    }

    #[test]
    fn set_value_updates_in_place() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add("k", "1", ConfigurationKeyOpts::default(), true).unwrap();
        store.set_value("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().unwrap().value, "2");
    }

    #[test]
    fn visible_entries_excludes_hidden_keys() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add("shown", "1", ConfigurationKeyOpts { visible: true, ..Default::default() }, true).unwrap();
        store.add("hidden", "1", ConfigurationKeyOpts { visible: false, ..Default::default() }, true).unwrap();
        let visible = store.visible_entries().unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].key, "shown");
    }

    #[test]
    fn opens_and_persists_across_handles_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.add("k", "1", ConfigurationKeyOpts::default(), true).unwrap();
        }
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().unwrap().value, "1");
    }
}
