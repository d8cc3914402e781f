pub mod api;
pub mod config;
pub mod engine;
pub mod monitor;
pub mod notify;
pub mod reporter;
pub mod scheduler;
pub mod state;
pub mod suppression;
pub mod types;

/// Torn API base URL.
pub const TORN_API_BASE: &str = "https://api.torn.com";

/// Maximum natural energy of a Torn account. Full energy suppresses drug alerts.
pub const DEFAULT_ENERGY_CAPACITY: u32 = 1000;

#[cfg(test)]
mod test_http;
