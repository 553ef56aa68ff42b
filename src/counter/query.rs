use std::collections::BTreeMap;

use chrono::Days;

use crate::counter::config::Dimension;
use crate::counter::types::{require, DailyViews, Summary};
use crate::counter::{CounterEngine, CounterError, ValidationError};
use crate::store::keys::{self, Metric, MetricKind};

impl CounterEngine {
    /// Aggregate counters for one resource.
    ///
    /// Only the configured dimensions are reported; counters recorded under any
    /// other device or country exist in the store but are not visible here.
    pub fn summary(&self, key_id: &str) -> Result<Summary, CounterError> {
        require("keyId", key_id)?;

        let views = self.read_counter(&keys::metric_key(key_id, Metric::Views))?;
        let unique_views = self.read_counter(&keys::metric_key(key_id, Metric::UniqueViews))?;

        let dims = &self.config.dimensions;
        let devices = self.read_dimensions(&dims.devices, |d| {
            keys::metric_key(key_id, Metric::Device(d))
        })?;
        let countries = self.read_dimensions(&dims.countries, |d| {
            keys::metric_key(key_id, Metric::Country(d))
        })?;

        let online_users = self.online_users(key_id)?;

        Ok(Summary {
            views,
            unique_views,
            devices,
            countries,
            online_users,
        })
    }

    /// Number of live presence markers for the resource.
    pub fn online_users(&self, key_id: &str) -> Result<u64, CounterError> {
        require("keyId", key_id)?;
        let prefix = keys::metric_prefix(key_id, MetricKind::Online);
        Ok(self.store.list_keys_with_prefix(&prefix)?.len() as u64)
    }

    /// Views for the `days` most recent UTC dates ending today, oldest first.
    pub fn daily_series(&self, key_id: &str, days: u32) -> Result<Vec<DailyViews>, CounterError> {
        require("keyId", key_id)?;
        let max = self.config.max_daily_days;
        if days == 0 || days > max {
            return Err(ValidationError::DaysOutOfRange {
                requested: days,
                max,
            }
            .into());
        }

        let today = self.clock.now().date_naive();
        let mut series = Vec::with_capacity(days as usize);
        for offset in (0..days).rev() {
            let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
                continue;
            };
            let views = self.read_counter(&keys::metric_key(key_id, Metric::DailyViews(date)))?;
            series.push(DailyViews { date, views });
        }
        Ok(series)
    }

    fn read_dimensions<F>(
        &self,
        dimensions: &[Dimension],
        key_for: F,
    ) -> Result<BTreeMap<String, u64>, CounterError>
    where
        F: Fn(&str) -> String,
    {
        let mut out = BTreeMap::new();
        for dim in dimensions {
            let value = self.read_counter(&key_for(&dim.stored))?;
            out.insert(dim.label.clone(), value);
        }
        Ok(out)
    }
}
