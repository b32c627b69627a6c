//! Tests for the repository layer: factory selection, the global
//! singleton, and the expanded behavior of the in-memory store.

use chrono::{Duration, TimeZone, Utc};

use wachtrij::db::repositories::LocalRepository;
use wachtrij::db::repository::{RepositoryError, SampleRepository};
use wachtrij::db::{RepositoryFactory, RepositoryType};
use wachtrij::models::{NewWaitSample, Weekday};

mod support;

use support::with_scoped_env;

fn sample(location_id: i32, wait: i32, ts: chrono::DateTime<Utc>) -> NewWaitSample {
    NewWaitSample {
        location_id,
        people_waiting: None,
        wait_minutes: wait,
        observed_at: ts,
    }
}

// =========================================================
// Factory and environment selection
// =========================================================

#[test]
fn repository_type_parses_known_names() {
    assert_eq!("local".parse::<RepositoryType>().unwrap(), RepositoryType::Local);
    assert_eq!("postgres".parse::<RepositoryType>().unwrap(), RepositoryType::Postgres);
    assert_eq!("PG".parse::<RepositoryType>().unwrap(), RepositoryType::Postgres);
    assert!("sqlite".parse::<RepositoryType>().is_err());
}

#[test]
fn repository_type_defaults_to_local_without_database_url() {
    let selected = with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        RepositoryType::from_env,
    );
    assert_eq!(selected, RepositoryType::Local);
}

#[test]
fn repository_type_prefers_postgres_when_url_is_set() {
    let selected = with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/wachtrij")),
        ],
        RepositoryType::from_env,
    );
    assert_eq!(selected, RepositoryType::Postgres);
}

#[test]
fn unrecognized_repository_type_falls_back_to_local() {
    // A typo must not select Postgres just because a URL is present;
    // the rejected value is logged on the way to the local default.
    let selected = with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("postgress")),
            ("DATABASE_URL", Some("postgres://localhost/wachtrij")),
        ],
        RepositoryType::from_env,
    );
    assert_eq!(selected, RepositoryType::Local);
}

#[test]
fn explicit_repository_type_wins_over_database_url() {
    let selected = with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", Some("postgres://localhost/wachtrij")),
        ],
        RepositoryType::from_env,
    );
    assert_eq!(selected, RepositoryType::Local);
}

#[tokio::test]
async fn factory_creates_a_working_local_repository() {
    let repo = RepositoryFactory::create_local();
    assert!(repo.health_check().await.unwrap());
    assert!(repo.latest_per_location().await.unwrap().is_empty());
}

// =========================================================
// Error type behavior
// =========================================================

#[test]
fn error_display_carries_context() {
    let err = RepositoryError::query("relation does not exist")
        .with_operation("latest_per_location");
    let rendered = err.to_string();
    assert!(rendered.contains("Query error"));
    assert!(rendered.contains("operation=latest_per_location"));
}

#[test]
fn retryability_follows_error_kind() {
    assert!(RepositoryError::connection("pool exhausted").is_retryable());
    assert!(!RepositoryError::configuration("missing DATABASE_URL").is_retryable());
    assert!(!RepositoryError::internal("join error").is_retryable());
}

// =========================================================
// In-memory store semantics
// =========================================================

#[tokio::test]
async fn empty_store_reads_cleanly() {
    let repo = LocalRepository::new();
    assert!(repo.latest_per_location().await.unwrap().is_empty());
    assert!(repo.mean_per_location().await.unwrap().is_empty());
    assert!(repo.hourly_averages(None).await.unwrap().is_empty());
    assert!(repo.most_recent_timestamp().await.unwrap().is_none());
    assert!(repo.location_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn append_is_cumulative_and_ordered() {
    let repo = LocalRepository::new();
    let t = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();

    assert_eq!(repo.append_samples(&[sample(1, 5, t)]).await.unwrap(), 1);
    assert_eq!(
        repo.append_samples(&[sample(1, 8, t + Duration::minutes(15)), sample(2, 3, t)])
            .await
            .unwrap(),
        2
    );
    assert_eq!(repo.sample_count(), 3);

    let latest = repo.latest_per_location().await.unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].location_id, 1);
    assert_eq!(latest[0].wait_minutes, 8);
}

#[tokio::test]
async fn most_recent_timestamp_tracks_the_maximum() {
    let repo = LocalRepository::new();
    let older = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
    let newer = older + Duration::hours(2);

    // Out-of-order append: the maximum still wins.
    repo.append_samples(&[sample(1, 5, newer), sample(2, 9, older)])
        .await
        .unwrap();
    assert_eq!(repo.most_recent_timestamp().await.unwrap(), Some(newer));
}

#[tokio::test]
async fn hourly_filter_respects_dst_transitions() {
    let repo = LocalRepository::new();
    // 2024-01-08 is a Monday in CET (UTC+1): 09:30 UTC is 10:30 local.
    let winter = Utc.with_ymd_and_hms(2024, 1, 8, 9, 30, 0).unwrap();
    // 2024-06-03 is a Monday in CEST (UTC+2): 08:30 UTC is 10:30 local.
    let summer = Utc.with_ymd_and_hms(2024, 6, 3, 8, 30, 0).unwrap();

    repo.append_samples(&[sample(1, 10, winter), sample(1, 30, summer)])
        .await
        .unwrap();

    let rows = repo.hourly_averages(Some(Weekday::MONDAY)).await.unwrap();
    // Both land in the same local 10:00 bucket despite different UTC hours.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].hour, 10);
    assert!((rows[0].avg_wait - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn upsert_replaces_existing_names() {
    let repo = LocalRepository::new();
    repo.upsert_location_names(&[(1, "Oud".to_string())])
        .await
        .unwrap();
    repo.upsert_location_names(&[(1, "Nieuw".to_string()), (2, "Noord".to_string())])
        .await
        .unwrap();

    let names = repo.location_names().await.unwrap();
    assert_eq!(names.len(), 2);
    assert_eq!(names.get(&1).map(String::as_str), Some("Nieuw"));
}
