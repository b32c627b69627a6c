//! Travel estimator: cycling routes with a great-circle fallback.
//!
//! The primary estimate comes from the OpenRouteService directions API.
//! Without a credential, or when the request fails in transit, we degrade
//! to a haversine distance at an assumed 15 km/h cycling speed, a path
//! that never fails on finite input. Only a malformed 200 response yields
//! an estimate with null numerics and an `error` reason.
//!
//! Estimates are cached per rounded-coordinate pair for a 5-minute time
//! bucket; the bucket index is part of the key, so expiry is just key
//! rollover and no background eviction is needed.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::warn;

use crate::models::{Coordinate, TravelEstimate};
use crate::services::polyline;

/// How long a cached estimate stays valid, in seconds.
pub const CACHE_VALIDITY_SECS: i64 = 300;
/// Assumed average cycling speed for the distance fallback.
pub const CYCLING_SPEED_KMH: f64 = 15.0;
/// Mean earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const DEFAULT_ORS_URL: &str = "https://api.openrouteservice.org/v2/directions/cycling-regular";

/// Configuration for the routing provider.
#[derive(Debug, Clone)]
pub struct TravelConfig {
    /// Routing API key; `None` selects the haversine fallback outright.
    pub api_key: Option<String>,
    /// Directions endpoint URL.
    pub base_url: String,
    /// Request timeout for routing calls.
    pub timeout: Duration,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ORS_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl TravelConfig {
    /// Read `ORS_API_KEY` and `ORS_BASE_URL` from the environment.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("ORS_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: std::env::var("ORS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ORS_URL.to_string()),
            ..Default::default()
        }
    }
}

/// Cache key: both coordinates rounded to 1e-4 degrees plus the 5-minute
/// bucket index. A pure function of the inputs and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    from: (i64, i64),
    to: (i64, i64),
    bucket: i64,
}

impl CacheKey {
    fn new(from: Coordinate, to: Coordinate, bucket: i64) -> Self {
        Self {
            from: round_coord(from),
            to: round_coord(to),
            bucket,
        }
    }
}

fn round_coord(c: Coordinate) -> (i64, i64) {
    ((c.lat * 1e4).round() as i64, (c.lon * 1e4).round() as i64)
}

#[derive(Debug, Deserialize)]
struct OrsResponse {
    routes: Vec<OrsRoute>,
}

#[derive(Debug, Deserialize)]
struct OrsRoute {
    summary: OrsSummary,
    geometry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrsSummary {
    duration: f64,
    distance: f64,
}

/// Produces travel estimates from a user coordinate to office coordinates.
pub struct TravelEstimator {
    client: reqwest::Client,
    config: TravelConfig,
    cache: Mutex<HashMap<CacheKey, TravelEstimate>>,
}

impl TravelEstimator {
    pub fn new(config: TravelConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Estimate travel from `from` to `to`, serving from the bucket cache
    /// when possible. Never returns an error: degraded results carry an
    /// `error` field instead.
    pub async fn estimate(&self, from: Coordinate, to: Coordinate) -> TravelEstimate {
        if !from.is_finite() || !to.is_finite() {
            return TravelEstimate::failed("non-finite coordinates");
        }

        let bucket = chrono::Utc::now().timestamp() / CACHE_VALIDITY_SECS;
        let key = CacheKey::new(from, to, bucket);

        if let Some(hit) = self.cache.lock().get(&key).cloned() {
            return hit;
        }

        let estimate = match self.config.api_key.as_deref() {
            Some(api_key) => self.routed_estimate(api_key, from, to).await,
            None => fallback_estimate(from, to),
        };

        let mut cache = self.cache.lock();
        // Keys from earlier buckets are dead; drop them as we go.
        cache.retain(|k, _| k.bucket == bucket);
        cache.insert(key, estimate.clone());
        estimate
    }

    /// Ask the routing provider, degrading to the haversine fallback on
    /// transport errors and non-200 responses. A 200 response we cannot
    /// interpret becomes an explicit error estimate instead of a guess.
    async fn routed_estimate(
        &self,
        api_key: &str,
        from: Coordinate,
        to: Coordinate,
    ) -> TravelEstimate {
        let body = serde_json::json!({
            "coordinates": [[from.lon, from.lat], [to.lon, to.lat]],
            "instructions": false,
        });

        let response = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", api_key)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!("routing request failed, using distance fallback: {}", e);
                return fallback_estimate(from, to);
            }
        };

        if !response.status().is_success() {
            warn!(
                status = %response.status(),
                "routing API returned an error, using distance fallback"
            );
            return fallback_estimate(from, to);
        }

        let parsed: OrsResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                warn!("malformed routing response: {}", e);
                return TravelEstimate::failed(format!("malformed routing response: {}", e));
            }
        };

        let route = match parsed.routes.first() {
            Some(r) => r,
            None => {
                warn!("routing response contained no routes");
                return TravelEstimate::failed("routing response contained no routes");
            }
        };

        let geometry = route
            .geometry
            .as_deref()
            .and_then(polyline::decode);

        TravelEstimate::resolved(
            (route.summary.duration / 60.0).round() as i64,
            round_km(route.summary.distance / 1000.0),
            geometry,
        )
    }
}

/// Distance-based estimate at the assumed cycling speed. Infallible for
/// finite coordinates.
pub fn fallback_estimate(from: Coordinate, to: Coordinate) -> TravelEstimate {
    if !from.is_finite() || !to.is_finite() {
        return TravelEstimate::failed("non-finite coordinates");
    }
    let distance_km = haversine_km(from, to);
    let duration_minutes = (distance_km / CYCLING_SPEED_KMH * 60.0).round() as i64;
    TravelEstimate::resolved(duration_minutes, round_km(distance_km), None)
}

/// Great-circle distance between two coordinates in kilometers.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlat = (to.lat - from.lat).to_radians();
    let dlon = (to.lon - from.lon).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * a.sqrt().asin() * EARTH_RADIUS_KM
}

fn round_km(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_one_degree_of_latitude() {
        let from = Coordinate::new(52.0, 4.9);
        let to = Coordinate::new(53.0, 4.9);
        let estimate = fallback_estimate(from, to);

        let distance = estimate.distance_km.unwrap();
        let duration = estimate.duration_minutes.unwrap();
        // One degree of latitude is ~111 km; at 15 km/h that is ~444 min.
        assert!((distance - 111.2).abs() < 1.0, "distance was {}", distance);
        assert!((duration - 444).abs() < 5, "duration was {}", duration);
        assert!(estimate.error.is_none());
    }

    #[test]
    fn fallback_zero_distance() {
        let c = Coordinate::new(52.37, 4.9);
        let estimate = fallback_estimate(c, c);
        assert_eq!(estimate.duration_minutes, Some(0));
        assert_eq!(estimate.distance_km, Some(0.0));
    }

    #[test]
    fn non_finite_input_is_an_error_estimate() {
        let estimate = fallback_estimate(
            Coordinate::new(f64::NAN, 4.9),
            Coordinate::new(52.0, 4.9),
        );
        assert!(!estimate.is_usable());
        assert!(estimate.error.is_some());
    }

    #[test]
    fn cache_key_is_stable_under_sub_rounding_noise() {
        let a = CacheKey::new(
            Coordinate::new(52.370212, 4.902134),
            Coordinate::new(52.3912, 4.9340),
            1234,
        );
        let b = CacheKey::new(
            Coordinate::new(52.370199, 4.902149),
            Coordinate::new(52.3912, 4.9340),
            1234,
        );
        assert_eq!(a, b);

        let other_bucket = CacheKey::new(
            Coordinate::new(52.370212, 4.902134),
            Coordinate::new(52.3912, 4.9340),
            1235,
        );
        assert_ne!(a, other_bucket);
    }

    #[tokio::test]
    async fn estimator_without_key_uses_fallback() {
        let estimator = TravelEstimator::new(TravelConfig::default());
        let estimate = estimator
            .estimate(Coordinate::new(52.37, 4.90), Coordinate::new(52.39, 4.93))
            .await;
        assert!(estimate.is_usable());
        assert!(estimate.geometry.is_none());
    }
}
