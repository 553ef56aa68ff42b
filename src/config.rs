use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_COUNTRIES, DEFAULT_DAILY_TTL_DAYS, DEFAULT_DEVICES, DEFAULT_MAX_DAILY_DAYS,
    DEFAULT_PRESENCE_TTL_SECS, DEFAULT_SESSION_TTL_SECS,
};

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub counter: CounterEnvConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone)]
pub struct CounterEnvConfig {
    pub devices: String,
    pub countries: String,
    pub max_daily_days: u32,
    pub session_ttl_secs: u64,
    pub presence_ttl_secs: u64,
    pub daily_ttl_days: u64,
}

impl Default for CounterEnvConfig {
    fn default() -> Self {
        Self {
            devices: DEFAULT_DEVICES.to_string(),
            countries: DEFAULT_COUNTRIES.to_string(),
            max_daily_days: DEFAULT_MAX_DAILY_DAYS,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            presence_ttl_secs: DEFAULT_PRESENCE_TTL_SECS,
            daily_ttl_days: DEFAULT_DAILY_TTL_DAYS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub marker_sweep_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            is_leader: true,
            marker_sweep_cron: "0 */5 * * * *".to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("enable_file_logs", &self.enable_file_logs)
            .field("log_dir", &self.log_dir)
            .field("sled_path", &self.sled_path)
            .field("cors_origin", &self.cors_origin)
            .field("counter", &self.counter)
            .field("worker", &self.worker)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        let counter_defaults = CounterEnvConfig::default();
        let worker_defaults = WorkerConfig::default();
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/counter.sled"),
            cors_origin: env_or("CORS_ORIGIN", "*"),
            counter: CounterEnvConfig {
                devices: env_or("COUNTER_DEVICES", &counter_defaults.devices),
                countries: env_or("COUNTER_COUNTRIES", &counter_defaults.countries),
                max_daily_days: env_or_parse(
                    "COUNTER_MAX_DAILY_DAYS",
                    counter_defaults.max_daily_days,
                ),
                session_ttl_secs: env_or_parse(
                    "COUNTER_SESSION_TTL_SECS",
                    counter_defaults.session_ttl_secs,
                ),
                presence_ttl_secs: env_or_parse(
                    "COUNTER_PRESENCE_TTL_SECS",
                    counter_defaults.presence_ttl_secs,
                ),
                daily_ttl_days: env_or_parse(
                    "COUNTER_DAILY_TTL_DAYS",
                    counter_defaults.daily_ttl_days,
                ),
            },
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", worker_defaults.is_leader),
                marker_sweep_cron: env_or("MARKER_SWEEP_CRON", &worker_defaults.marker_sweep_cron),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
