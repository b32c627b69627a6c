//! Ranking engine: best location by wait alone and by wait plus travel.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::TravelEstimate;
use crate::services::aggregation::CurrentWait;

/// One entry of the combined (wait + travel) ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLocation {
    pub stadsloket_id: i32,
    pub loket_name: String,
    pub wait_time: i32,
    pub people_waiting: Option<i32>,
    pub travel_time: i64,
    pub distance_km: Option<f64>,
    pub total_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<[f64; 2]>>,
}

/// The location with the lowest current wait. Empty input yields `None`,
/// not an error.
pub fn best_by_wait(current: &[CurrentWait]) -> Option<&CurrentWait> {
    current.iter().min_by_key(|w| w.wait_minutes)
}

/// Rank locations by `wait + travel` ascending.
///
/// Locations without a usable travel estimate are excluded (logged, not
/// fatal). The sort is stable, so ties keep the input order.
pub fn rank_combined(
    current: &[CurrentWait],
    travel: &HashMap<i32, TravelEstimate>,
) -> Vec<RankedLocation> {
    let mut ranked: Vec<RankedLocation> = current
        .iter()
        .filter_map(|wait| {
            let estimate = match travel.get(&wait.location_id) {
                Some(e) => e,
                None => {
                    debug!(
                        location_id = wait.location_id,
                        "no travel estimate, excluded from combined ranking"
                    );
                    return None;
                }
            };
            let travel_time = match estimate.duration_minutes {
                Some(minutes) => minutes,
                None => {
                    debug!(
                        location_id = wait.location_id,
                        "travel estimate unusable, excluded from combined ranking"
                    );
                    return None;
                }
            };

            Some(RankedLocation {
                stadsloket_id: wait.location_id,
                loket_name: wait.display_name.clone(),
                wait_time: wait.wait_minutes,
                people_waiting: wait.people_waiting,
                travel_time,
                distance_km: estimate.distance_km,
                total_time: wait.wait_minutes as i64 + travel_time,
                geometry: estimate.geometry.clone(),
            })
        })
        .collect();

    ranked.sort_by_key(|r| r.total_time);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn wait(location_id: i32, minutes: i32) -> CurrentWait {
        CurrentWait {
            location_id,
            display_name: format!("Loket {}", location_id),
            wait_minutes: minutes,
            people_waiting: Some(1),
            observed_at: Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap(),
        }
    }

    fn travel(minutes: i64) -> TravelEstimate {
        TravelEstimate::resolved(minutes, 2.5, None)
    }

    #[test]
    fn best_by_wait_picks_minimum() {
        let waits = vec![wait(1, 10), wait(2, 3), wait(3, 8)];
        assert_eq!(best_by_wait(&waits).unwrap().location_id, 2);
    }

    #[test]
    fn best_by_wait_empty_is_none() {
        assert!(best_by_wait(&[]).is_none());
    }

    #[test]
    fn combined_excludes_missing_travel_and_sorts_by_total() {
        let waits = vec![wait(1, 10), wait(2, 3), wait(3, 8)];
        let mut estimates = HashMap::new();
        estimates.insert(1, travel(5));
        estimates.insert(2, travel(20));
        estimates.insert(3, TravelEstimate::failed("routing API error"));

        let ranked = rank_combined(&waits, &estimates);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].stadsloket_id, 1);
        assert_eq!(ranked[0].total_time, 15);
        assert_eq!(ranked[1].stadsloket_id, 2);
        assert_eq!(ranked[1].total_time, 23);
    }

    #[test]
    fn combined_ties_keep_input_order() {
        let waits = vec![wait(4, 10), wait(5, 10)];
        let mut estimates = HashMap::new();
        estimates.insert(4, travel(5));
        estimates.insert(5, travel(5));

        let ranked = rank_combined(&waits, &estimates);
        assert_eq!(ranked[0].stadsloket_id, 4);
        assert_eq!(ranked[1].stadsloket_id, 5);
    }
}
