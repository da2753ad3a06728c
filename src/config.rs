//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), with sensible defaults for local
//! development.

use std::net::SocketAddr;
use std::time::Duration;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// How long a connection may go without a heartbeat before the sweep
    /// task evicts it.
    pub liveness_timeout: Duration,

    /// Interval between sweep cycles. Must be well below the liveness
    /// timeout; the sweep granularity bounds eviction latency.
    pub sweep_interval: Duration,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Fan successful results out to every requester connection instead of
    /// only the originator. Off by default: fan-out leaks one requester's
    /// content to all of them.
    pub broadcast_results: bool,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let liveness_timeout_ms = parse_env("LIVENESS_TIMEOUT_MS", 2_000);
        let sweep_interval_ms = parse_env("SWEEP_INTERVAL_MS", 100);
        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", 10_000);
        let broadcast_results = parse_env_bool("BROADCAST_RESULTS", false);

        Ok(Self {
            listen_addr,
            liveness_timeout: Duration::from_millis(liveness_timeout_ms),
            sweep_interval: Duration::from_millis(sweep_interval_ms),
            event_bus_capacity,
            broadcast_results,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some("true") | Some("TRUE") | Some("1") => true,
        Some("false") | Some("FALSE") | Some("0") => false,
        _ => default,
    }
}
