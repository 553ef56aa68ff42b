/// Session (uniqueness) marker lifetime: 24 hours
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Presence marker lifetime: 5 minutes
pub const DEFAULT_PRESENCE_TTL_SECS: u64 = 300;

/// Daily bucket lifetime
pub const DEFAULT_DAILY_TTL_DAYS: u64 = 30;

/// Largest window accepted by the daily series query
pub const DEFAULT_MAX_DAILY_DAYS: u32 = 366;

/// Window used when the daily series request omits `days`
pub const DEFAULT_DAILY_DAYS: u32 = 7;

pub const DEFAULT_DEVICES: &str = "mobile,desktop,tablet";

pub const DEFAULT_COUNTRIES: &str = "us=US,india=IN,france=FR,canada=CA,uk=GB,australia=AU";

/// Idle lock entries are pruned once the per-resource lock map grows past this size
pub const RESOURCE_LOCK_PRUNE_THRESHOLD: usize = 1000;

/// Upper bound on entries removed by one expired-marker sweep
pub const MAX_SWEEP_REMOVALS: u32 = 10_000;
