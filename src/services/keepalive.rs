//! Windowed liveness probe.
//!
//! The hosting platform idles the service when it sees no traffic, which
//! would silently stop data collection. This task pings the service's
//! own health endpoint every few minutes during waking hours, with a
//! secondary probe URL as backup. Strictly best-effort: failures are
//! logged and never touch the collection pipeline.

use std::time::Duration;

use chrono::Timelike;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::models::LOCAL_TZ;

/// Configuration for the liveness probe.
#[derive(Debug, Clone)]
pub struct KeepaliveConfig {
    /// Primary probe URL, typically the service's own `/health`.
    pub url: String,
    /// Secondary probe tried when the primary fails.
    pub fallback_url: Option<String>,
    /// Minutes between probes.
    pub interval_minutes: u64,
    /// Active window in Amsterdam local hours, inclusive start,
    /// exclusive end.
    pub window_hours: (u32, u32),
}

impl KeepaliveConfig {
    /// Build from the environment; returns `None` when no primary URL is
    /// configured via `KEEPALIVE_URL`.
    ///
    /// `KEEPALIVE_FALLBACK_URL` sets the secondary probe,
    /// `KEEPALIVE_INTERVAL_MINUTES` the cadence (default 8, minimum 1),
    /// and `KEEPALIVE_WINDOW_START` / `KEEPALIVE_WINDOW_END` the active
    /// Amsterdam-local window (default 7..23).
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("KEEPALIVE_URL").ok().filter(|u| !u.is_empty())?;
        let interval_minutes = std::env::var("KEEPALIVE_INTERVAL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8)
            .max(1);
        let window_start = std::env::var("KEEPALIVE_WINDOW_START")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(7);
        let window_end = std::env::var("KEEPALIVE_WINDOW_END")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(23);
        Some(Self {
            url,
            fallback_url: std::env::var("KEEPALIVE_FALLBACK_URL")
                .ok()
                .filter(|u| !u.is_empty()),
            interval_minutes,
            window_hours: (window_start, window_end),
        })
    }

    /// Whether the given Amsterdam-local hour falls inside the window.
    pub fn in_window(&self, local_hour: u32) -> bool {
        let (start, end) = self.window_hours;
        local_hour >= start && local_hour < end
    }
}

/// Probe loop. Never returns; never propagates failures.
pub async fn run_keepalive(config: KeepaliveConfig) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap_or_default();

    let mut ticker =
        tokio::time::interval(Duration::from_secs(config.interval_minutes * 60));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let local_hour = chrono::Utc::now().with_timezone(&LOCAL_TZ).hour();
        if !config.in_window(local_hour) {
            debug!(local_hour, "keepalive outside active window, skipping");
            continue;
        }

        if probe(&client, &config.url).await {
            continue;
        }
        if let Some(fallback) = &config.fallback_url {
            if !probe(&client, fallback).await {
                warn!("both keepalive probes failed");
            }
        }
    }
}

async fn probe(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            warn!(url, status = %response.status(), "keepalive probe rejected");
            false
        }
        Err(e) => {
            warn!(url, "keepalive probe failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> KeepaliveConfig {
        KeepaliveConfig {
            url: "http://localhost:8080/health".to_string(),
            fallback_url: None,
            interval_minutes: 8,
            window_hours: (7, 23),
        }
    }

    #[test]
    fn window_boundaries() {
        let cfg = config();
        assert!(!cfg.in_window(6));
        assert!(cfg.in_window(7));
        assert!(cfg.in_window(22));
        assert!(!cfg.in_window(23));
    }
}
