use crate::counter::types::{Ack, TrackingEvent};
use crate::counter::{CounterEngine, CounterError};
use crate::store::keys::{self, Metric};

impl CounterEngine {
    /// Apply one tracking event.
    ///
    /// Invalid events are rejected before any store call. For a valid event the
    /// views, device, country and daily counters are incremented, the presence
    /// marker is refreshed, and the unique counter is incremented only when no
    /// live session marker exists. A store failure aborts the remaining steps
    /// without undoing the ones already written.
    pub async fn record(&self, event: &TrackingEvent) -> Result<Ack, CounterError> {
        event.validate()?;
        let key_id = event.key_id.as_str();

        let lock = self.acquire_resource_lock(key_id).await;
        let _guard = lock.lock().await;

        self.increment(&keys::metric_key(key_id, Metric::Views), None)?;

        let session_key = keys::metric_key(key_id, Metric::Session(&event.session_id));
        let unique_session = self.store.get(&session_key)?.is_none();
        if unique_session {
            self.store
                .put(&session_key, "1", Some(self.config.session_ttl()))?;
            self.increment(&keys::metric_key(key_id, Metric::UniqueViews), None)?;
        }

        self.increment(&keys::metric_key(key_id, Metric::Device(&event.device)), None)?;
        self.increment(
            &keys::metric_key(key_id, Metric::Country(&event.country)),
            None,
        )?;

        self.store.put(
            &keys::metric_key(key_id, Metric::Online(&event.session_id)),
            "1",
            Some(self.config.presence_ttl()),
        )?;

        let today = self.clock.now().date_naive();
        self.increment(
            &keys::metric_key(key_id, Metric::DailyViews(today)),
            Some(self.config.daily_ttl()),
        )?;

        tracing::debug!(key_id, unique_session, "tracking event recorded");

        Ok(Ack {
            recorded: true,
            unique_session,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use crate::clock::ManualClock;
    use crate::counter::testing::SpyStore;
    use crate::counter::{CounterConfig, ValidationError};

    use super::*;

    fn engine_with(store: Arc<SpyStore>) -> CounterEngine {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap(),
        ));
        CounterEngine::new(CounterConfig::default(), store, clock)
    }

    #[tokio::test]
    async fn first_event_writes_all_six_metrics() {
        let store = Arc::new(SpyStore::default());
        let engine = engine_with(store.clone());

        let ack = engine
            .record(&TrackingEvent::new("k1", "s1", "mobile", "US"))
            .await
            .unwrap();
        assert!(ack.unique_session);

        assert_eq!(store.raw("views:k1").as_deref(), Some("1"));
        assert_eq!(store.raw("unique_views:k1").as_deref(), Some("1"));
        assert_eq!(store.raw("session:k1:s1").as_deref(), Some("1"));
        assert_eq!(store.raw("device:k1:mobile").as_deref(), Some("1"));
        assert_eq!(store.raw("country:k1:US").as_deref(), Some("1"));
        assert!(store.raw("online:k1:s1").is_some());
        assert_eq!(store.raw("daily_views:k1:2024-05-10").as_deref(), Some("1"));
        // views, session marker, unique, device, country, presence, daily
        assert_eq!(store.put_count(), 7);
    }

    #[tokio::test]
    async fn repeat_session_skips_unique_increment() {
        let store = Arc::new(SpyStore::default());
        let engine = engine_with(store.clone());
        let event = TrackingEvent::new("k1", "s1", "desktop", "FR");

        engine.record(&event).await.unwrap();
        let ack = engine.record(&event).await.unwrap();

        assert!(!ack.unique_session);
        assert_eq!(store.raw("views:k1").as_deref(), Some("2"));
        assert_eq!(store.raw("unique_views:k1").as_deref(), Some("1"));
        assert_eq!(store.raw("device:k1:desktop").as_deref(), Some("2"));
        assert_eq!(store.raw("daily_views:k1:2024-05-10").as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn unknown_device_gets_its_own_counter() {
        let store = Arc::new(SpyStore::default());
        let engine = engine_with(store.clone());

        engine
            .record(&TrackingEvent::new("k1", "s1", "smart-tv", "BR"))
            .await
            .unwrap();
        assert_eq!(store.raw("device:k1:smart-tv").as_deref(), Some("1"));
        assert_eq!(store.raw("country:k1:BR").as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn invalid_event_touches_nothing() {
        let store = Arc::new(SpyStore::default());
        let engine = engine_with(store.clone());

        let cases = [
            TrackingEvent::new("", "s1", "mobile", "US"),
            TrackingEvent::new("k1", "", "mobile", "US"),
            TrackingEvent::new("k1", "s1", "", "US"),
            TrackingEvent::new("k1", "s1", "mobile", ""),
        ];
        for event in &cases {
            let err = engine.record(event).await.unwrap_err();
            assert!(matches!(
                err,
                CounterError::Validation(ValidationError::MissingField(_))
            ));
        }

        assert_eq!(store.put_count(), 0);
        assert_eq!(store.gets.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_unavailable() {
        let store = Arc::new(SpyStore::failing());
        let engine = engine_with(store);

        let err = engine
            .record(&TrackingEvent::new("k1", "s1", "mobile", "US"))
            .await
            .unwrap_err();
        assert!(matches!(err, CounterError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn corrupt_counter_is_reported() {
        let store = Arc::new(SpyStore::default());
        store.insert_raw("views:k1", "lots");
        let engine = engine_with(store);

        let err = engine
            .record(&TrackingEvent::new("k1", "s1", "mobile", "US"))
            .await
            .unwrap_err();
        assert!(matches!(err, CounterError::CorruptCounter { key } if key == "views:k1"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_events_do_not_lose_increments() {
        let store = Arc::new(SpyStore::default());
        let engine = Arc::new(engine_with(store.clone()));

        let mut handles = Vec::new();
        for i in 0..64 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                let event = TrackingEvent::new("hot", &format!("s{}", i % 8), "mobile", "US");
                engine.record(&event).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.raw("views:hot").as_deref(), Some("64"));
        assert_eq!(store.raw("unique_views:hot").as_deref(), Some("8"));
        assert_eq!(store.raw("device:hot:mobile").as_deref(), Some("64"));
    }
}
