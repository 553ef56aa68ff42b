use std::sync::Arc;

use axum::Router;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use tokio::sync::broadcast;

use view_counter::clock::ManualClock;
use view_counter::config::{Config, CounterEnvConfig, WorkerConfig};
use view_counter::counter::{CounterConfig, CounterEngine};
use view_counter::routes::build_router;
use view_counter::state::AppState;
use view_counter::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    _temp_dir: TempDir,
}

pub fn test_config(sled_path: String) -> Config {
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        cors_origin: "*".to_string(),
        counter: CounterEnvConfig::default(),
        worker: WorkerConfig {
            is_leader: false,
            ..WorkerConfig::default()
        },
    }
}

pub async fn spawn_test_app_with(counter: CounterEnvConfig) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("counter-test.sled");

    // Config is built directly to avoid env var races between parallel tests.
    let mut config = test_config(sled_path.to_string_lossy().to_string());
    config.counter = counter;

    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 7, 15, 10, 0, 0).unwrap(),
    ));
    let store = Arc::new(Store::open_with_clock(&config.sled_path, clock.clone()).expect("open store"));
    let engine = Arc::new(CounterEngine::new(
        CounterConfig::from_env(&config.counter),
        store.clone(),
        clock.clone(),
    ));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(store, engine, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        clock,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_test_app_with(CounterEnvConfig::default()).await
}
