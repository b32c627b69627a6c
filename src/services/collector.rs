//! Collection pipeline: poll the upstream feed and persist samples.
//!
//! One pass fetches the wait-time JSON, normalizes the Dutch wait text,
//! appends the batch, and then refreshes the name table from the public
//! page. A failed pass is logged and skipped; the next scheduled tick is
//! the retry. Passes never overlap; the loop awaits each one.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::db::repository::SampleRepository;
use crate::models::{normalize_wait, NewWaitSample};

const DEFAULT_DATA_URL: &str = "https://wachttijdenamsterdam.nl/data/";
const DEFAULT_NAMES_URL: &str = "https://wachttijdenamsterdam.nl/";

/// Markup pattern the public page uses for its location headings:
/// `<h2 class="loket" data-id="3">Stadsloket Zuidoost</h2>`.
fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<h2[^>]*\bdata-id="(\d+)"[^>]*>([^<]+)</h2>"#)
            .expect("valid name-scrape regex")
    })
}

/// Configuration for the collection pipeline.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Wait-time JSON endpoint.
    pub data_url: String,
    /// Page scraped for location names.
    pub names_url: String,
    /// Minutes between collection passes.
    pub interval_minutes: u64,
    /// Request timeout for upstream calls.
    pub timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            names_url: DEFAULT_NAMES_URL.to_string(),
            interval_minutes: 15,
            timeout: Duration::from_secs(10),
        }
    }
}

impl CollectorConfig {
    /// Read `UPSTREAM_DATA_URL`, `UPSTREAM_NAMES_URL`, and
    /// `COLLECT_INTERVAL_MINUTES` from the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_url: std::env::var("UPSTREAM_DATA_URL").unwrap_or(defaults.data_url),
            names_url: std::env::var("UPSTREAM_NAMES_URL").unwrap_or(defaults.names_url),
            // A zero period would panic the interval timer at startup.
            interval_minutes: std::env::var("COLLECT_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.interval_minutes)
                .max(1),
            timeout: defaults.timeout,
        }
    }
}

/// Error for a collection pass.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("store error: {0}")]
    Store(#[from] crate::db::repository::RepositoryError),
}

/// One raw entry of the upstream wait-time feed.
#[derive(Debug, Deserialize)]
pub struct UpstreamEntry {
    pub id: i32,
    pub waiting: Option<i32>,
    pub waittime: Option<String>,
}

/// Turn an upstream entry into a storable sample, stamped `now`.
pub fn to_sample(entry: &UpstreamEntry, observed_at: chrono::DateTime<chrono::Utc>) -> NewWaitSample {
    NewWaitSample {
        location_id: entry.id,
        people_waiting: entry.waiting,
        wait_minutes: normalize_wait(entry.waittime.as_deref()),
        observed_at,
    }
}

/// Extract `(id, name)` pairs from the public page markup.
pub fn scrape_names(html: &str) -> Vec<(i32, String)> {
    name_pattern()
        .captures_iter(html)
        .filter_map(|caps| {
            let id = caps.get(1)?.as_str().parse::<i32>().ok()?;
            let name = caps.get(2)?.as_str().trim().to_string();
            if name.is_empty() {
                None
            } else {
                Some((id, name))
            }
        })
        .collect()
}

/// Run a single collection pass: fetch, normalize, store, refresh names.
pub async fn collect_once(
    repo: &dyn SampleRepository,
    client: &reqwest::Client,
    config: &CollectorConfig,
) -> Result<usize, CollectError> {
    let entries: Vec<UpstreamEntry> = client
        .get(&config.data_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let now = chrono::Utc::now();
    let samples: Vec<NewWaitSample> = entries.iter().map(|e| to_sample(e, now)).collect();
    let stored = repo.append_samples(&samples).await?;
    info!(locations = stored, "stored wait-time samples");

    // Name refresh is best-effort: stale names are better than no samples.
    match refresh_names(repo, client, config).await {
        Ok(count) => info!(names = count, "refreshed location names"),
        Err(e) => warn!("name refresh failed: {}", e),
    }

    Ok(stored)
}

/// Scrape the public page and upsert the name table.
async fn refresh_names(
    repo: &dyn SampleRepository,
    client: &reqwest::Client,
    config: &CollectorConfig,
) -> Result<usize, CollectError> {
    let html = client
        .get(&config.names_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let pairs = scrape_names(&html);
    if pairs.is_empty() {
        warn!("name scrape matched nothing; page markup may have changed");
        return Ok(0);
    }
    Ok(repo.upsert_location_names(&pairs).await?)
}

/// Periodic collection loop. Runs one pass immediately, then one per
/// interval; at most one pass is in flight at any time.
pub async fn run_collector(repo: Arc<dyn SampleRepository>, config: CollectorConfig) {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .unwrap_or_default();

    let mut ticker =
        tokio::time::interval(Duration::from_secs(config.interval_minutes * 60));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Err(e) = collect_once(repo.as_ref(), &client, &config).await {
            error!("collection pass failed, waiting for next tick: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SENTINEL_HOUR_OR_MORE;

    #[test]
    fn upstream_entry_normalizes_wait_text() {
        let now = chrono::Utc::now();
        let entry = UpstreamEntry {
            id: 3,
            waiting: Some(7),
            waittime: Some("15 minuten".to_string()),
        };
        let sample = to_sample(&entry, now);
        assert_eq!(sample.location_id, 3);
        assert_eq!(sample.people_waiting, Some(7));
        assert_eq!(sample.wait_minutes, 15);
        assert_eq!(sample.observed_at, now);

        let closed = UpstreamEntry {
            id: 4,
            waiting: None,
            waittime: None,
        };
        assert_eq!(to_sample(&closed, now).wait_minutes, 0);

        let long = UpstreamEntry {
            id: 5,
            waiting: Some(40),
            waittime: Some("1 uur".to_string()),
        };
        assert_eq!(to_sample(&long, now).wait_minutes, SENTINEL_HOUR_OR_MORE);
    }

    #[test]
    fn scrape_extracts_id_name_pairs() {
        let html = r#"
            <div class="loketten">
              <h2 class="loket" data-id="1">Stadsloket Centrum</h2>
              <p>wachttijd: 15 minuten</p>
              <h2 class="loket" data-id="3"> Stadsloket Zuidoost </h2>
            </div>
        "#;
        let pairs = scrape_names(html);
        assert_eq!(
            pairs,
            vec![
                (1, "Stadsloket Centrum".to_string()),
                (3, "Stadsloket Zuidoost".to_string()),
            ]
        );
    }

    #[test]
    fn scrape_ignores_unrelated_markup() {
        let html = "<h2>Over deze site</h2><h2 data-id=\"x\">Broken</h2>";
        assert!(scrape_names(html).is_empty());
    }
}
