//! Aggregation engine: current waits, mean waits, and hourly profiles.
//!
//! Consumes the sample store and the name table; everything here is
//! read-only. Missing data never drops a row: absent names render as a
//! placeholder, absent buckets render as zero.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::repository::{RepositoryResult, SampleRepository};
use crate::models::Weekday;

/// First hour shown on the hourly chart (inclusive).
pub const CHART_HOUR_START: u8 = 8;
/// Last hour shown on the hourly chart (inclusive).
pub const CHART_HOUR_END: u8 = 20;

/// Current wait state for one location, joined with its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWait {
    pub location_id: i32,
    pub display_name: String,
    pub wait_minutes: i32,
    pub people_waiting: Option<i32>,
    pub observed_at: DateTime<Utc>,
}

/// Mean wait for one location in the legacy response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanWaitEntry(pub i32, pub String, pub i64);

/// One chart series: a location's average wait per hour bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub label: String,
    pub data: Vec<f64>,
}

/// Complete hourly chart payload for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyProfile {
    /// Always the 13 labels "8:00".."20:00", regardless of data.
    pub labels: Vec<String>,
    pub datasets: Vec<HourlySeries>,
    pub day_of_week: u8,
    pub opening_hours: (u8, u8),
}

/// Synthesized placeholder for a location the name refresh has not seen.
fn placeholder_name(location_id: i32) -> String {
    format!("Unknown-{}", location_id)
}

/// Current wait per location: the most recent sample each, left-joined
/// with names so an orphan location id still shows up.
pub async fn current_waits(repo: &dyn SampleRepository) -> RepositoryResult<Vec<CurrentWait>> {
    let latest = repo.latest_per_location().await?;
    let names = repo.location_names().await?;

    Ok(latest
        .into_iter()
        .map(|row| {
            let display_name = names
                .get(&row.location_id)
                .cloned()
                .unwrap_or_else(|| placeholder_name(row.location_id));
            CurrentWait {
                location_id: row.location_id,
                display_name,
                wait_minutes: row.wait_minutes,
                people_waiting: row.people_waiting,
                observed_at: row.observed_at,
            }
        })
        .collect())
}

/// Mean wait per location over the full history, in the legacy triple
/// shape `[location_id, display_name, mean]`.
pub async fn mean_waits(repo: &dyn SampleRepository) -> RepositoryResult<Vec<MeanWaitEntry>> {
    let means = repo.mean_per_location().await?;
    let names = repo.location_names().await?;

    Ok(means
        .into_iter()
        .map(|row| {
            let name = names
                .get(&row.location_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string());
            let mean = if row.mean_wait.is_finite() {
                row.mean_wait.round() as i64
            } else {
                0
            };
            MeanWaitEntry(row.location_id, name, mean)
        })
        .collect())
}

/// The fixed chart axis labels, "8:00" through "20:00".
pub fn hour_labels() -> Vec<String> {
    (CHART_HOUR_START..=CHART_HOUR_END)
        .map(|h| format!("{}:00", h))
        .collect()
}

/// Hourly average profile for one weekday, as a complete chart payload.
///
/// Hour buckets with no samples are filled with 0 so the 8..20 axis
/// always renders fully. One series per location, ordered by id.
pub async fn hourly_profile(
    repo: &dyn SampleRepository,
    day: Weekday,
) -> RepositoryResult<HourlyProfile> {
    let rows = repo.hourly_averages(Some(day)).await?;
    let names = repo.location_names().await?;

    let location_ids: BTreeSet<i32> = rows.iter().map(|r| r.location_id).collect();

    let datasets = location_ids
        .into_iter()
        .map(|location_id| {
            let label = names
                .get(&location_id)
                .cloned()
                .unwrap_or_else(|| placeholder_name(location_id));
            let data = (CHART_HOUR_START..=CHART_HOUR_END)
                .map(|hour| {
                    rows.iter()
                        .find(|r| r.location_id == location_id && r.hour == hour)
                        .map(|r| r.avg_wait)
                        .unwrap_or(0.0)
                })
                .collect();
            HourlySeries { label, data }
        })
        .collect();

    Ok(HourlyProfile {
        labels: hour_labels(),
        datasets,
        day_of_week: day.value(),
        opening_hours: day.opening_hours(),
    })
}

#[cfg(test)]
#[path = "aggregation_tests.rs"]
mod aggregation_tests;
