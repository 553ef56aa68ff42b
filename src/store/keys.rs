//! Storage key construction. Every key written to the store is built here.
//!
//! Metric keys have the shape `{kind}:{resource}` or `{kind}:{resource}:{dimension}`.
//! Free-form segments are escaped so that `:` only ever appears as a separator,
//! which keeps the mapping injective and makes `{kind}:{resource}:` a prefix that
//! matches exactly one resource.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Views,
    UniqueViews,
    Device,
    Country,
    Session,
    Online,
    DailyViews,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::UniqueViews => "unique_views",
            Self::Device => "device",
            Self::Country => "country",
            Self::Session => "session",
            Self::Online => "online",
            Self::DailyViews => "daily_views",
        }
    }
}

/// A metric for one resource, carrying the dimension or date its kind requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric<'a> {
    Views,
    UniqueViews,
    Device(&'a str),
    Country(&'a str),
    Session(&'a str),
    Online(&'a str),
    DailyViews(NaiveDate),
}

impl Metric<'_> {
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Views => MetricKind::Views,
            Self::UniqueViews => MetricKind::UniqueViews,
            Self::Device(_) => MetricKind::Device,
            Self::Country(_) => MetricKind::Country,
            Self::Session(_) => MetricKind::Session,
            Self::Online(_) => MetricKind::Online,
            Self::DailyViews(_) => MetricKind::DailyViews,
        }
    }
}

pub fn metric_key(resource_key: &str, metric: Metric<'_>) -> String {
    let kind = metric.kind().as_str();
    let resource = escape_segment(resource_key);
    match metric {
        Metric::Views | Metric::UniqueViews => format!("{kind}:{resource}"),
        Metric::Device(dim)
        | Metric::Country(dim)
        | Metric::Session(dim)
        | Metric::Online(dim) => format!("{kind}:{resource}:{}", escape_segment(dim)),
        Metric::DailyViews(date) => format!("{kind}:{resource}:{}", date.format("%Y-%m-%d")),
    }
}

/// Prefix shared by every dimensioned key of `kind` for one resource.
pub fn metric_prefix(resource_key: &str, kind: MetricKind) -> String {
    format!("{}:{}:", kind.as_str(), escape_segment(resource_key))
}

pub fn user_key(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn project_key(email: &str, project_key: &str) -> String {
    format!(
        "{}:{}",
        escape_segment(&user_key(email)),
        escape_segment(project_key)
    )
}

pub fn project_prefix(email: &str) -> String {
    format!("{}:", escape_segment(&user_key(email)))
}

fn escape_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            other => out.push(other),
        }
    }
    out
}
