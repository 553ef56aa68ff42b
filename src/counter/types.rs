use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::counter::error::ValidationError;

/// One tracking ping. Absent fields deserialize as empty and are rejected by `validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub country: String,
}

impl TrackingEvent {
    pub fn new(key_id: &str, session_id: &str, device: &str, country: &str) -> Self {
        Self {
            key_id: key_id.to_string(),
            session_id: session_id.to_string(),
            device: device.to_string(),
            country: country.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("keyId", &self.key_id)?;
        require("sessionId", &self.session_id)?;
        require("device", &self.device)?;
        require("country", &self.country)?;
        Ok(())
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    pub recorded: bool,
    /// True when no live session marker existed, i.e. the event counted as a unique view.
    pub unique_session: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub views: u64,
    pub unique_views: u64,
    pub devices: BTreeMap<String, u64>,
    pub countries: BTreeMap<String, u64>,
    pub online_users: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyViews {
    pub date: NaiveDate,
    pub views: u64,
}
