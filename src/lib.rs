//! Real-time view counter: per-resource view, unique-session, device, country
//! and daily counters plus a rolling "online now" count, kept in a sled-backed
//! key-value store with per-entry expiry.

pub mod clock;
pub mod config;
pub mod constants;
pub mod counter;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;
pub mod workers;
