//! Domain types for wait-time samples, offices, and travel estimates.
//!
//! Timestamps are stored as UTC but all bucketing (hour of day, weekday)
//! uses the Amsterdam wall clock, so a sample taken at 16:55 local time
//! lands in the 16:00 bucket regardless of DST.

pub mod normalize;
pub mod offices;
pub mod weekday;

pub use normalize::{normalize_wait, MAX_LITERAL_MINUTES, SENTINEL_HOUR_OR_MORE};
pub use offices::{office_by_id, OfficeLocation, OFFICES};
pub use weekday::{InvalidWeekday, Weekday};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single civil timezone used for sampling and bucketing.
pub const LOCAL_TZ: chrono_tz::Tz = chrono_tz::Europe::Amsterdam;

/// One stored wait-time observation. Append-only; never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitSample {
    /// Row identity, assigned by the store. Used as the deterministic
    /// tie-break when two samples share an exact timestamp.
    pub id: i64,
    pub location_id: i32,
    /// Number of people in the queue; `None` when upstream omits it.
    pub people_waiting: Option<i32>,
    /// Normalized wait in minutes, always in {0} ∪ [1,60] ∪ {70}.
    pub wait_minutes: i32,
    pub observed_at: DateTime<Utc>,
}

/// A wait-time observation before it is assigned a row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWaitSample {
    pub location_id: i32,
    pub people_waiting: Option<i32>,
    pub wait_minutes: i32,
    pub observed_at: DateTime<Utc>,
}

/// Most recent reading for one location, as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestWait {
    pub location_id: i32,
    pub wait_minutes: i32,
    pub people_waiting: Option<i32>,
    pub observed_at: DateTime<Utc>,
}

/// Mean wait over the full sample history of one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanWait {
    pub location_id: i32,
    pub mean_wait: f64,
}

/// Average wait for one `(location, hour-of-day)` bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyAverage {
    pub location_id: i32,
    /// Hour of day in Amsterdam local time, 0..=23.
    pub hour: u8,
    pub avg_wait: f64,
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Ephemeral travel estimate from a user location to an office.
///
/// Never persisted; recomputed (or served from the time-bucketed cache)
/// on every ranking request. Callers must check the numeric fields for
/// `None` before combining them into totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelEstimate {
    pub duration_minutes: Option<i64>,
    pub distance_km: Option<f64>,
    /// Route geometry as `[lat, lon]` pairs, when the routing provider
    /// returned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<[f64; 2]>>,
    /// Reason the estimate is unusable, when it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TravelEstimate {
    /// An estimate with both numeric fields present.
    pub fn resolved(
        duration_minutes: i64,
        distance_km: f64,
        geometry: Option<Vec<[f64; 2]>>,
    ) -> Self {
        Self {
            duration_minutes: Some(duration_minutes),
            distance_km: Some(distance_km),
            geometry,
            error: None,
        }
    }

    /// An unusable estimate carrying the failure reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            duration_minutes: None,
            distance_km: None,
            geometry: None,
            error: Some(reason.into()),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.duration_minutes.is_some()
    }
}
