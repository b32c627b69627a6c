use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{Duration, TimeZone, Utc};

use wachtrij::db::repository::SampleRepository;
use wachtrij::models::NewWaitSample;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
#[allow(dead_code)]
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Seed a repository with a deterministic history: `count` samples spread
/// over three locations, one per 15 minutes walking back from a fixed
/// Monday morning, with names registered for all three.
#[allow(dead_code)]
pub async fn seed_samples(repo: &dyn SampleRepository, count: usize) {
    let base = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
    let samples: Vec<NewWaitSample> = (0..count)
        .map(|i| NewWaitSample {
            location_id: (i % 3) as i32 + 1,
            people_waiting: Some((i % 12) as i32),
            wait_minutes: (i % 61) as i32,
            observed_at: base - Duration::minutes(15 * i as i64),
        })
        .collect();
    repo.append_samples(&samples)
        .await
        .expect("seeding samples");
    repo.upsert_location_names(&[
        (1, "Stadsloket Centrum".to_string()),
        (2, "Stadsloket Noord".to_string()),
        (3, "Stadsloket Zuidoost".to_string()),
    ])
    .await
    .expect("seeding names");
}
