//! In-memory repository for unit testing and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use parking_lot::RwLock;

use crate::db::repository::{RepositoryResult, SampleRepository};
use crate::models::{HourlyAverage, LatestWait, MeanWait, NewWaitSample, WaitSample, Weekday, LOCAL_TZ};

/// In-memory implementation of [`SampleRepository`].
///
/// Holds the append-only sample log and the name table behind a single
/// `RwLock` each; aggregate queries scan the log. Intended for tests and
/// development runs, where histories stay small.
#[derive(Default)]
pub struct LocalRepository {
    samples: RwLock<Vec<WaitSample>>,
    names: RwLock<HashMap<i32, String>>,
    next_id: RwLock<i64>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored samples. Test helper.
    pub fn sample_count(&self) -> usize {
        self.samples.read().len()
    }
}

#[async_trait]
impl SampleRepository for LocalRepository {
    async fn append_samples(&self, samples: &[NewWaitSample]) -> RepositoryResult<usize> {
        let mut log = self.samples.write();
        let mut next_id = self.next_id.write();
        for sample in samples {
            *next_id += 1;
            log.push(WaitSample {
                id: *next_id,
                location_id: sample.location_id,
                people_waiting: sample.people_waiting,
                wait_minutes: sample.wait_minutes,
                observed_at: sample.observed_at,
            });
        }
        Ok(samples.len())
    }

    async fn upsert_location_names(&self, names: &[(i32, String)]) -> RepositoryResult<usize> {
        let mut table = self.names.write();
        for (id, name) in names {
            table.insert(*id, name.clone());
        }
        Ok(names.len())
    }

    async fn latest_per_location(&self) -> RepositoryResult<Vec<LatestWait>> {
        let log = self.samples.read();
        let mut latest: HashMap<i32, &WaitSample> = HashMap::new();
        for sample in log.iter() {
            let keep = match latest.get(&sample.location_id) {
                // Equal timestamps: highest row id wins.
                Some(current) => (sample.observed_at, sample.id) > (current.observed_at, current.id),
                None => true,
            };
            if keep {
                latest.insert(sample.location_id, sample);
            }
        }

        let mut rows: Vec<LatestWait> = latest
            .into_values()
            .map(|s| LatestWait {
                location_id: s.location_id,
                wait_minutes: s.wait_minutes,
                people_waiting: s.people_waiting,
                observed_at: s.observed_at,
            })
            .collect();
        rows.sort_by_key(|r| r.location_id);
        Ok(rows)
    }

    async fn mean_per_location(&self) -> RepositoryResult<Vec<MeanWait>> {
        let log = self.samples.read();
        let mut sums: HashMap<i32, (f64, usize)> = HashMap::new();
        for sample in log.iter() {
            let entry = sums.entry(sample.location_id).or_insert((0.0, 0));
            entry.0 += sample.wait_minutes as f64;
            entry.1 += 1;
        }

        let mut rows: Vec<MeanWait> = sums
            .into_iter()
            .map(|(location_id, (sum, count))| MeanWait {
                location_id,
                mean_wait: sum / count as f64,
            })
            .collect();
        rows.sort_by_key(|r| r.location_id);
        Ok(rows)
    }

    async fn hourly_averages(&self, day: Option<Weekday>) -> RepositoryResult<Vec<HourlyAverage>> {
        let log = self.samples.read();
        let mut sums: HashMap<(i32, u8), (f64, usize)> = HashMap::new();
        for sample in log.iter() {
            let local = sample.observed_at.with_timezone(&LOCAL_TZ);
            if let Some(wanted) = day {
                if Weekday::from_date(&local) != wanted {
                    continue;
                }
            }
            let hour = local.hour() as u8;
            let entry = sums.entry((sample.location_id, hour)).or_insert((0.0, 0));
            entry.0 += sample.wait_minutes as f64;
            entry.1 += 1;
        }

        let mut rows: Vec<HourlyAverage> = sums
            .into_iter()
            .map(|((location_id, hour), (sum, count))| HourlyAverage {
                location_id,
                hour,
                avg_wait: sum / count as f64,
            })
            .collect();
        rows.sort_by_key(|r| (r.location_id, r.hour));
        Ok(rows)
    }

    async fn most_recent_timestamp(&self) -> RepositoryResult<Option<DateTime<Utc>>> {
        Ok(self.samples.read().iter().map(|s| s.observed_at).max())
    }

    async fn location_names(&self) -> RepositoryResult<HashMap<i32, String>> {
        Ok(self.names.read().clone())
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
