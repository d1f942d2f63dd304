use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// The closed set of logical records kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Theme,
    Bmi,
    Goals,
    Activities,
    FoodLog,
    Gallery,
}

impl StoreKey {
    pub const ALL: [StoreKey; 6] = [
        StoreKey::Theme,
        StoreKey::Bmi,
        StoreKey::Goals,
        StoreKey::Activities,
        StoreKey::FoodLog,
        StoreKey::Gallery,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::Bmi => "bmiData",
            Self::Goals => "goalsData",
            Self::Activities => "activities",
            Self::FoodLog => "foodLog",
            Self::Gallery => "gallery",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String-keyed JSON record store backed by a single SQLite table.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open store: {}", path.display()))?;
        let store = Store { conn };
        store.migrate()?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Store { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    /// The stored JSON text for `key`, verbatim.
    pub fn raw(&self, key: StoreKey) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key.as_str()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn set_raw(&self, key: StoreKey, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key.as_str(), value, now],
        )?;
        tracing::trace!(key = key.as_str(), bytes = value.len(), "stored record");
        Ok(())
    }

    /// Decode the record under `key`. A missing record is `None`; a malformed one is an error.
    pub fn get<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>> {
        match self.raw(key)? {
            Some(text) => {
                let value = serde_json::from_str(&text)
                    .with_context(|| format!("Stored record '{key}' is not valid"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Like [`Store::get`], treating a missing record as empty.
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: StoreKey) -> Result<T> {
        Ok(self.get(key)?.unwrap_or_default())
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)
            .with_context(|| format!("Failed to encode record '{key}'"))?;
        self.set_raw(key, &text)
    }

    pub fn remove(&self, key: StoreKey) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key.as_str()])?;
        Ok(rows > 0)
    }
}
