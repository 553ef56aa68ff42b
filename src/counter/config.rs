use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COUNTRIES, DEFAULT_DAILY_TTL_DAYS, DEFAULT_DEVICES, DEFAULT_MAX_DAILY_DAYS,
    DEFAULT_PRESENCE_TTL_SECS, DEFAULT_SESSION_TTL_SECS,
};

/// One reported dimension: `label` is the field name in the summary, `stored`
/// is the dimension value events are counted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub label: String,
    pub stored: String,
}

impl Dimension {
    /// Parses `label` or `label=STORED`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.split_once('=') {
            Some((label, stored)) => {
                let (label, stored) = (label.trim(), stored.trim());
                if label.is_empty() || stored.is_empty() {
                    return None;
                }
                Some(Self {
                    label: label.to_string(),
                    stored: stored.to_string(),
                })
            }
            None => Some(Self {
                label: raw.to_string(),
                stored: raw.to_string(),
            }),
        }
    }
}

/// The fixed set of device and country dimensions the summary reports on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionSet {
    pub devices: Vec<Dimension>,
    pub countries: Vec<Dimension>,
}

impl DimensionSet {
    pub fn parse(devices: &str, countries: &str) -> Self {
        Self {
            devices: parse_list(devices),
            countries: parse_list(countries),
        }
    }
}

impl Default for DimensionSet {
    fn default() -> Self {
        Self::parse(DEFAULT_DEVICES, DEFAULT_COUNTRIES)
    }
}

fn parse_list(raw: &str) -> Vec<Dimension> {
    let mut out: Vec<Dimension> = Vec::new();
    for item in raw.split(',') {
        let Some(dim) = Dimension::parse(item) else {
            continue;
        };
        if out.iter().any(|d| d.label == dim.label) {
            tracing::warn!(label = %dim.label, "Duplicate dimension label ignored");
            continue;
        }
        out.push(dim);
    }
    out
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterConfig {
    pub session_ttl_secs: u64,
    pub presence_ttl_secs: u64,
    pub daily_ttl_days: u64,
    pub max_daily_days: u32,
    pub dimensions: DimensionSet,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            presence_ttl_secs: DEFAULT_PRESENCE_TTL_SECS,
            daily_ttl_days: DEFAULT_DAILY_TTL_DAYS,
            max_daily_days: DEFAULT_MAX_DAILY_DAYS,
            dimensions: DimensionSet::default(),
        }
    }
}

impl CounterConfig {
    pub fn from_env(env_config: &crate::config::CounterEnvConfig) -> Self {
        Self {
            session_ttl_secs: env_config.session_ttl_secs,
            presence_ttl_secs: env_config.presence_ttl_secs,
            daily_ttl_days: env_config.daily_ttl_days,
            max_daily_days: env_config.max_daily_days,
            dimensions: DimensionSet::parse(&env_config.devices, &env_config.countries),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.session_ttl_secs == 0 {
            return Err("session_ttl_secs must be > 0".to_string());
        }
        if self.presence_ttl_secs == 0 {
            return Err("presence_ttl_secs must be > 0".to_string());
        }
        if self.daily_ttl_days == 0 {
            return Err("daily_ttl_days must be > 0".to_string());
        }
        if self.max_daily_days == 0 {
            return Err("max_daily_days must be > 0".to_string());
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn presence_ttl(&self) -> Duration {
        Duration::from_secs(self.presence_ttl_secs)
    }

    pub fn daily_ttl(&self) -> Duration {
        Duration::from_secs(self.daily_ttl_days.saturating_mul(24 * 60 * 60))
    }
}
