//! Data Transfer Objects for the HTTP API.
//!
//! The aggregation and ranking DTOs are re-exported from the service
//! layer since they already derive Serialize/Deserialize; the response
//! shapes here are the legacy ones the chart frontend consumes.

use serde::{Deserialize, Serialize};

use crate::models::Coordinate;

// Re-export existing DTOs that are already serializable
pub use crate::services::aggregation::{HourlyProfile, HourlySeries, MeanWaitEntry};
pub use crate::services::ranking::RankedLocation;

/// Query parameters for the hourly chart endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HourlyQuery {
    /// Weekday 0 (Sunday) .. 6 (Saturday); defaults to today in
    /// Amsterdam when absent.
    #[serde(default)]
    pub day: Option<u8>,
}

/// Query parameters for the combined-times endpoint.
///
/// Coordinates arrive as strings so a non-numeric value can be rejected
/// with an explicit message rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CombinedTimesQuery {
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
}

/// One office in the `/api/offices` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeDto {
    pub lat: f64,
    pub lon: f64,
    pub address: String,
}

/// Response for the combined-times endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedTimesResponse {
    pub user_location: Coordinate,
    /// Sorted ascending by `total_time`.
    pub locations: Vec<RankedLocation>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" or "error"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }
}
