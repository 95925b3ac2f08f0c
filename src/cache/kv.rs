//! Key-value backends the agenda cache persists through.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::sync::Mutex;

/// Synchronous key-value store with enumerable keys.
///
/// Reads that fail are reported as misses; writes may fail (capacity,
/// I/O, poisoned lock) and return an error the caller is expected to
/// absorb. Nothing here ever reaches the network.
pub trait KvStore: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&self, key: &str, value: &str) -> Result<()>;
  fn remove(&self, key: &str);
  fn keys(&self) -> Vec<String>;
}

/// Store that never retains anything. Selected when caching is disabled
/// in config: every load goes straight to the network.
pub struct NoopKv;

impl KvStore for NoopKv {
  fn get(&self, _key: &str) -> Option<String> {
    None // Always miss
  }

  fn set(&self, _key: &str, _value: &str) -> Result<()> {
    Ok(()) // Discard
  }

  fn remove(&self, _key: &str) {}

  fn keys(&self) -> Vec<String> {
    Vec::new()
  }
}

/// SQLite-backed store at the user's data directory.
pub struct SqliteKv {
  conn: Mutex<Connection>,
}

/// Schema for the key-value table.
const KV_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

impl SqliteKv {
  /// Open or create the store at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// Open a throwaway in-memory store.
  #[allow(dead_code)]
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory store: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(KV_SCHEMA)
      .map_err(|e| eyre!("Failed to create cache schema: {}", e))?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Default database path under the user data directory.
  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("prontio").join("cache.db"))
  }
}

impl KvStore for SqliteKv {
  fn get(&self, key: &str) -> Option<String> {
    let conn = self.conn.lock().ok()?;
    conn
      .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
        row.get(0)
      })
      .ok()
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    conn
      .execute(
        "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to write {}: {}", key, e))?;
    Ok(())
  }

  fn remove(&self, key: &str) {
    if let Ok(conn) = self.conn.lock() {
      let _ = conn.execute("DELETE FROM kv WHERE key = ?", params![key]);
    }
  }

  fn keys(&self) -> Vec<String> {
    let conn = match self.conn.lock() {
      Ok(conn) => conn,
      Err(_) => return Vec::new(),
    };
    let mut stmt = match conn.prepare("SELECT key FROM kv") {
      Ok(stmt) => stmt,
      Err(_) => return Vec::new(),
    };
    stmt
      .query_map([], |row| row.get(0))
      .map(|rows| rows.filter_map(|r| r.ok()).collect())
      .unwrap_or_default()
  }
}

/// In-memory store for unit tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryKv {
  entries: Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl KvStore for MemoryKv {
  fn get(&self, key: &str) -> Option<String> {
    self.entries.lock().ok()?.get(key).cloned()
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?
      .insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) {
    if let Ok(mut entries) = self.entries.lock() {
      entries.remove(key);
    }
  }

  fn keys(&self) -> Vec<String> {
    self
      .entries
      .lock()
      .map(|entries| entries.keys().cloned().collect())
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sqlite_kv_round_trip() {
    let kv = SqliteKv::open_in_memory().unwrap();
    assert_eq!(kv.get("a"), None);

    kv.set("a", "1").unwrap();
    assert_eq!(kv.get("a"), Some("1".to_string()));

    kv.set("a", "2").unwrap();
    assert_eq!(kv.get("a"), Some("2".to_string()));
  }

  #[test]
  fn test_sqlite_kv_remove_and_keys() {
    let kv = SqliteKv::open_in_memory().unwrap();
    kv.set("a", "1").unwrap();
    kv.set("b", "2").unwrap();

    let mut keys = kv.keys();
    keys.sort();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

    kv.remove("a");
    assert_eq!(kv.get("a"), None);
    assert_eq!(kv.keys(), vec!["b".to_string()]);

    // Removing a missing key is a no-op
    kv.remove("a");
  }

  #[test]
  fn test_noop_kv_never_stores() {
    let kv = NoopKv;
    kv.set("a", "1").unwrap();
    assert_eq!(kv.get("a"), None);
    assert!(kv.keys().is_empty());
  }
}
