//! Startup configuration read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TIME_SCALE: f64 = 1.0;
/// Largest accepted `BILLZY_TIME_SCALE`; a portal upload at this scale takes
/// under an hour.
pub const MAX_TIME_SCALE: f64 = 1000.0;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Multiplier on simulated task durations; 0 finishes tasks immediately.
    pub time_scale: f64,
    /// Sessions untouched for this long are dropped on the next login.
    pub session_idle_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            time_scale: DEFAULT_TIME_SCALE,
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

impl ApiConfig {
    /// Read `BILLZY_BIND_ADDR`, `BILLZY_TIME_SCALE` and `BILLZY_SESSION_IDLE_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_addr = match lookup("BILLZY_BIND_ADDR").map(|raw| raw.parse::<SocketAddr>()) {
            Some(Ok(addr)) => addr,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "BILLZY_BIND_ADDR invalid; using {DEFAULT_BIND_ADDR}");
                defaults.bind_addr
            }
            None => {
                tracing::warn!("BILLZY_BIND_ADDR not set; using {DEFAULT_BIND_ADDR}");
                defaults.bind_addr
            }
        };

        let time_scale = match lookup("BILLZY_TIME_SCALE").map(|raw| raw.parse::<f64>()) {
            Some(Ok(scale)) if (0.0..=MAX_TIME_SCALE).contains(&scale) => scale,
            Some(_) => {
                tracing::warn!(
                    "BILLZY_TIME_SCALE must be between 0 and {MAX_TIME_SCALE}; using {DEFAULT_TIME_SCALE}"
                );
                defaults.time_scale
            }
            None => defaults.time_scale,
        };

        let session_idle_timeout =
            match lookup("BILLZY_SESSION_IDLE_SECS").map(|raw| raw.parse::<u64>()) {
                Some(Ok(secs)) if secs > 0 => Duration::from_secs(secs),
                Some(_) => {
                    tracing::warn!(
                        "BILLZY_SESSION_IDLE_SECS invalid; using {DEFAULT_SESSION_IDLE_SECS}"
                    );
                    defaults.session_idle_timeout
                }
                None => defaults.session_idle_timeout,
            };

        Self {
            bind_addr,
            time_scale,
            session_idle_timeout,
        }
    }

    /// Config for tests: loopback, instant tasks.
    pub fn instant() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            time_scale: 0.0,
            ..Self::default()
        }
    }
}
