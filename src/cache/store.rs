//! Read-through cache for agenda listings.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agenda::{Appointment, ViewKind};

use super::kv::KvStore;

/// Every cache key lives under this prefix, one namespace per view kind:
/// `agenda.<view-kind>.<YYYY-MM-DD>`.
const NAMESPACE: &str = "agenda";

/// How long a cached listing stays servable.
const DEFAULT_MAX_AGE_MS: i64 = 120_000;

/// Persisted shape: capture time plus the listing as the server sent it.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
  /// Capture time, epoch milliseconds
  timestamp: i64,
  items: Vec<Appointment>,
}

/// Local cache keyed by `(view kind, date)`.
///
/// Staleness is enforced on read: an entry older than the max age is
/// treated as a miss and deleted on the spot. Storage failures are
/// absorbed, degrading the cache to a pass-through rather than failing
/// the load that touched it.
#[derive(Clone)]
pub struct AgendaCache {
  kv: Arc<dyn KvStore>,
  max_age: Duration,
}

impl AgendaCache {
  pub fn new(kv: Arc<dyn KvStore>) -> Self {
    Self {
      kv,
      max_age: Duration::milliseconds(DEFAULT_MAX_AGE_MS),
    }
  }

  /// Override the staleness cutoff.
  pub fn with_max_age(mut self, max_age: Duration) -> Self {
    self.max_age = max_age;
    self
  }

  fn entry_key(kind: ViewKind, date_key: &str) -> String {
    format!("{}.{}.{}", NAMESPACE, kind.as_str(), date_key)
  }

  /// Look up the listing for a key. Returns `None` when the entry is
  /// absent, unreadable, or older than the max age; unreadable and stale
  /// entries are removed so the next read misses without re-checking.
  pub fn get(&self, kind: ViewKind, date_key: &str) -> Option<Vec<Appointment>> {
    let key = Self::entry_key(kind, date_key);
    let raw = self.kv.get(&key)?;

    let entry: CacheEntry = match serde_json::from_str(&raw) {
      Ok(entry) => entry,
      Err(err) => {
        tracing::debug!(%key, %err, "dropping unreadable cache entry");
        self.kv.remove(&key);
        return None;
      }
    };

    let age_ms = Utc::now().timestamp_millis() - entry.timestamp;
    if age_ms > self.max_age.num_milliseconds() {
      self.kv.remove(&key);
      return None;
    }

    Some(entry.items)
  }

  /// Persist a listing, overwriting any previous entry for the key.
  pub fn set(&self, kind: ViewKind, date_key: &str, items: &[Appointment]) {
    let entry = CacheEntry {
      timestamp: Utc::now().timestamp_millis(),
      items: items.to_vec(),
    };
    let raw = match serde_json::to_string(&entry) {
      Ok(raw) => raw,
      Err(err) => {
        tracing::debug!(%err, "failed to serialize cache entry");
        return;
      }
    };

    let key = Self::entry_key(kind, date_key);
    if let Err(err) = self.kv.set(&key, &raw) {
      tracing::debug!(%key, %err, "cache write failed, continuing without cache");
    }
  }

  /// Remove one entry. No-op when absent.
  pub fn invalidate(&self, kind: ViewKind, date_key: &str) {
    self.kv.remove(&Self::entry_key(kind, date_key));
  }

  /// Remove every entry in this cache's namespace, both view kinds.
  pub fn invalidate_all(&self) {
    let prefix = format!("{}.", NAMESPACE);
    for key in self.kv.keys() {
      if key.starts_with(&prefix) {
        self.kv.remove(&key);
      }
    }
  }
}
