//! View counter engine: event ingestion and read-side aggregation over a
//! plain get/put/prefix-scan key-value store.

pub mod config;
pub mod error;
pub mod ingest;
pub mod query;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::constants::RESOURCE_LOCK_PRUNE_THRESHOLD;
use crate::store::kv::KvStore;

pub use config::{CounterConfig, Dimension, DimensionSet};
pub use error::{CounterError, ValidationError};
pub use types::{Ack, DailyViews, Summary, TrackingEvent};

pub struct CounterEngine {
    config: CounterConfig,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    resource_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CounterEngine {
    pub fn new(config: CounterConfig, store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store,
            clock,
            resource_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    /// Lock serializing read-modify-write cycles for one resource key within this process.
    async fn acquire_resource_lock(&self, key_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.resource_locks.lock().await;

        // strong_count == 1 means only the map holds the lock, so nobody is waiting on it.
        if locks.len() > RESOURCE_LOCK_PRUNE_THRESHOLD {
            locks.retain(|_, v| Arc::strong_count(v) > 1);
        }

        locks
            .entry(key_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Missing counters read as zero.
    fn read_counter(&self, key: &str) -> Result<u64, CounterError> {
        match self.store.get(key)? {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| CounterError::CorruptCounter {
                    key: key.to_string(),
                }),
            None => Ok(0),
        }
    }

    /// Read-modify-write +1. Not atomic on its own; callers hold the resource lock.
    fn increment(&self, key: &str, ttl: Option<Duration>) -> Result<u64, CounterError> {
        let next = self.read_counter(key)?.saturating_add(1);
        self.store.put(key, &next.to_string(), ttl)?;
        tracing::trace!(key, value = next, "counter incremented");
        Ok(next)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::store::kv::KvStore;
    use crate::store::StoreError;

    /// In-memory store that ignores TTLs and counts calls.
    #[derive(Default)]
    pub struct SpyStore {
        entries: Mutex<HashMap<String, String>>,
        pub puts: AtomicUsize,
        pub gets: AtomicUsize,
        pub fail_puts: bool,
    }

    impl SpyStore {
        pub fn failing() -> Self {
            Self {
                fail_puts: true,
                ..Self::default()
            }
        }

        pub fn put_count(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        pub fn insert_raw(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }
    }

    impl KvStore for SpyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        fn put(&self, key: &str, value: &str, _ttl: Option<Duration>) -> Result<(), StoreError> {
            if self.fail_puts {
                return Err(StoreError::Sled(sled::Error::Unsupported(
                    "store offline".into(),
                )));
            }
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn list_keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect())
        }
    }
}
