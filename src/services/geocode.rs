//! Postcode geocoding with strict input validation.
//!
//! A Dutch postcode is one digit 1-9, three digits, two uppercase
//! letters. Anything that does not normalize into that shape is rejected
//! before any network call. Lookups go to a Nominatim-style endpoint
//! restricted to NL; "not found" and network failures both surface as
//! `Ok(None)`. Only bad input is an error.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use parking_lot::RwLock;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::models::Coordinate;

const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = concat!("wachtrij/", env!("CARGO_PKG_VERSION"));

fn postcode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[1-9][0-9]{3}[A-Z]{2}$").expect("valid postcode regex"))
}

/// Strip all whitespace and uppercase, e.g. `"1011 pn"` -> `"1011PN"`.
pub fn normalize_postcode(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Check a normalized postcode against the strict Dutch shape.
pub fn is_valid_postcode(normalized: &str) -> bool {
    postcode_pattern().is_match(normalized)
}

/// Error for geocoding requests.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("invalid postcode: {0:?}")]
    InvalidPostcode(String),
}

/// Configuration for the geocoder endpoint.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl GeocodeConfig {
    /// Read `GEOCODER_URL` from the environment.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GEOCODER_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: String,
    lon: String,
}

/// Resolves Dutch postcodes to coordinates, caching hits for the process
/// lifetime; postcodes do not move.
pub struct Geocoder {
    client: reqwest::Client,
    config: GeocodeConfig,
    cache: RwLock<HashMap<String, Coordinate>>,
}

impl Geocoder {
    pub fn new(config: GeocodeConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a raw postcode to coordinates.
    ///
    /// # Returns
    /// * `Ok(Some(coordinate))` - resolved (possibly from cache)
    /// * `Ok(None)` - postcode unknown to the geocoder, or lookup failed
    /// * `Err(GeocodeError::InvalidPostcode)` - input failed the shape
    ///   check; no network call was made
    pub async fn resolve(&self, raw: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let postcode = normalize_postcode(raw);
        if !is_valid_postcode(&postcode) {
            return Err(GeocodeError::InvalidPostcode(raw.to_string()));
        }

        if let Some(hit) = self.cache.read().get(&postcode).copied() {
            return Ok(Some(hit));
        }

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("postalcode", postcode.as_str()),
                ("countrycodes", "nl"),
                ("format", "json"),
                ("limit", "1"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(postcode = %postcode, "geocoder request failed: {}", e);
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            warn!(postcode = %postcode, status = %response.status(), "geocoder returned an error");
            return Ok(None);
        }

        let hits: Vec<GeocodeHit> = match response.json().await {
            Ok(h) => h,
            Err(e) => {
                warn!(postcode = %postcode, "malformed geocoder response: {}", e);
                return Ok(None);
            }
        };

        let coordinate = hits.first().and_then(|hit| {
            let lat = hit.lat.parse::<f64>().ok()?;
            let lon = hit.lon.parse::<f64>().ok()?;
            Some(Coordinate::new(lat, lon))
        });

        match coordinate {
            Some(c) => {
                self.cache.write().insert(postcode, c);
                Ok(Some(c))
            }
            None => Ok(None),
        }
    }

    /// Number of cached postcodes. Test helper.
    pub fn cache_len(&self) -> usize {
        self.cache.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_whitespace_and_uppercases() {
        assert_eq!(normalize_postcode("1011 PN"), "1011PN");
        assert_eq!(normalize_postcode(" 1011pn "), "1011PN");
        assert_eq!(normalize_postcode("1011\tpn"), "1011PN");
    }

    #[test]
    fn shape_check_accepts_valid_postcodes() {
        assert!(is_valid_postcode("1011PN"));
        assert!(is_valid_postcode("9999ZZ"));
    }

    #[test]
    fn shape_check_rejects_invalid_postcodes() {
        assert!(!is_valid_postcode("0111PN")); // leading zero
        assert!(!is_valid_postcode("ABCDEF"));
        assert!(!is_valid_postcode("1011P"));
        assert!(!is_valid_postcode("1011pn")); // normalization is the caller's job
        assert!(!is_valid_postcode("1011PNX"));
    }

    #[tokio::test]
    async fn invalid_postcode_fails_without_network() {
        // Unroutable base URL: a network attempt would error loudly
        // instead of returning InvalidPostcode.
        let geocoder = Geocoder::new(GeocodeConfig {
            base_url: "http://127.0.0.1:1/search".to_string(),
            timeout: Duration::from_millis(100),
        });
        let result = geocoder.resolve("ABCDEF").await;
        assert!(matches!(result, Err(GeocodeError::InvalidPostcode(_))));
        assert_eq!(geocoder.cache_len(), 0);
    }

    #[tokio::test]
    async fn unreachable_geocoder_is_not_found() {
        let geocoder = Geocoder::new(GeocodeConfig {
            base_url: "http://127.0.0.1:1/search".to_string(),
            timeout: Duration::from_millis(100),
        });
        let result = geocoder.resolve("1011 PN").await.unwrap();
        assert!(result.is_none());
    }
}
