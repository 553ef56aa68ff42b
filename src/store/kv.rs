use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::{Store, StoreError};

/// The capability set the counter engine is written against.
///
/// There is no increment primitive. Counters are updated with a
/// `get` followed by a `put`, and callers that need the pair to be atomic must
/// serialize it themselves. `list_keys_with_prefix` must only return live keys.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    fn list_keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at_ms: Option<i64>,
}

impl Entry {
    fn is_live(&self, now_ms: i64) -> bool {
        self.expires_at_ms.map_or(true, |at| at > now_ms)
    }
}

impl Store {
    fn now_ms(&self) -> i64 {
        self.clock().now().timestamp_millis()
    }

    /// Remove up to `limit` expired counter entries. Returns how many were removed.
    ///
    /// An entry rewritten between the scan and the removal is left alone.
    pub fn purge_expired(&self, limit: u32) -> Result<u32, StoreError> {
        let now_ms = self.now_ms();
        let mut removed = 0u32;

        for item in self.counters.iter() {
            if removed >= limit {
                break;
            }
            let (k, v) = item?;
            let entry: Entry = match Self::deserialize(&v) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping undecodable counter entry");
                    continue;
                }
            };
            if entry.is_live(now_ms) {
                continue;
            }
            if self
                .counters
                .compare_and_swap(&k, Some(&v), None::<&[u8]>)?
                .is_ok()
            {
                removed += 1;
            }
        }

        Ok(removed)
    }
}

impl KvStore for Store {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let Some(raw) = self.counters.get(key.as_bytes())? else {
            return Ok(None);
        };
        let entry: Entry = Self::deserialize(&raw)?;
        if !entry.is_live(self.now_ms()) {
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let expires_at_ms = ttl.map(|ttl| {
            let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            self.now_ms().saturating_add(ttl_ms)
        });
        let entry = Entry {
            value: value.to_string(),
            expires_at_ms,
        };
        self.counters
            .insert(key.as_bytes(), Self::serialize(&entry)?)?;
        Ok(())
    }

    fn list_keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let now_ms = self.now_ms();
        let mut keys = Vec::new();

        for item in self.counters.scan_prefix(prefix.as_bytes()) {
            let (k, v) = item?;
            let entry: Entry = Self::deserialize(&v)?;
            if !entry.is_live(now_ms) {
                continue;
            }
            match String::from_utf8(k.to_vec()) {
                Ok(key) => keys.push(key),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping counter key with invalid UTF-8");
                }
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use crate::clock::ManualClock;

    use super::*;

    fn open(clock: Arc<ManualClock>) -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kv-db");
        let store = Store::open_with_clock(path.to_str().unwrap(), clock).unwrap();
        (dir, store)
    }

    fn start_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn get_missing_is_none() {
        let (_dir, store) = open(start_clock());
        assert!(store.get("views:nothing").unwrap().is_none());
    }

    #[test]
    fn put_without_ttl_persists() {
        let clock = start_clock();
        let (_dir, store) = open(clock.clone());
        store.put("views:k", "7", None).unwrap();
        clock.advance(chrono::Duration::days(400));
        assert_eq!(store.get("views:k").unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn ttl_entry_expires_on_read() {
        let clock = start_clock();
        let (_dir, store) = open(clock.clone());
        store
            .put("online:k:s", "1", Some(Duration::from_secs(300)))
            .unwrap();

        clock.advance(chrono::Duration::seconds(299));
        assert!(store.get("online:k:s").unwrap().is_some());

        clock.advance(chrono::Duration::seconds(1));
        assert!(store.get("online:k:s").unwrap().is_none());
    }

    #[test]
    fn rewrite_resets_ttl() {
        let clock = start_clock();
        let (_dir, store) = open(clock.clone());
        let ttl = Some(Duration::from_secs(300));
        store.put("online:k:s", "1", ttl).unwrap();
        clock.advance(chrono::Duration::seconds(200));
        store.put("online:k:s", "1", ttl).unwrap();
        clock.advance(chrono::Duration::seconds(200));
        assert!(store.get("online:k:s").unwrap().is_some());
    }

    #[test]
    fn prefix_scan_skips_expired() {
        let clock = start_clock();
        let (_dir, store) = open(clock.clone());
        store
            .put("online:k:a", "1", Some(Duration::from_secs(60)))
            .unwrap();
        store
            .put("online:k:b", "1", Some(Duration::from_secs(600)))
            .unwrap();
        store.put("online:other:c", "1", None).unwrap();

        assert_eq!(store.list_keys_with_prefix("online:k:").unwrap().len(), 2);
        clock.advance(chrono::Duration::seconds(61));
        assert_eq!(
            store.list_keys_with_prefix("online:k:").unwrap(),
            vec!["online:k:b".to_string()]
        );
    }

    #[test]
    fn purge_removes_only_expired() {
        let clock = start_clock();
        let (_dir, store) = open(clock.clone());
        store
            .put("session:k:a", "1", Some(Duration::from_secs(10)))
            .unwrap();
        store
            .put("session:k:b", "1", Some(Duration::from_secs(10)))
            .unwrap();
        store.put("views:k", "3", None).unwrap();

        assert_eq!(store.purge_expired(100).unwrap(), 0);
        clock.advance(chrono::Duration::seconds(11));
        assert_eq!(store.purge_expired(1).unwrap(), 1);
        assert_eq!(store.purge_expired(100).unwrap(), 1);
        assert_eq!(store.counters.len(), 1);
    }
}
