//! Postgres repository implementation using Diesel.
//!
//! Implements [`SampleRepository`] against the `wait_times` / `loket_names`
//! schema. Aggregates run in SQL so the full sample history never crosses
//! the wire; hour and weekday bucketing happens in Amsterdam local time via
//! `AT TIME ZONE`.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_MAX_RETRIES`: Retry attempts for transient failures (default: 3)

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::Integer;
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tokio::task;

use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, SampleRepository};
use crate::models::{HourlyAverage, LatestWait, MeanWait, NewWaitSample, Weekday};

mod models;
mod schema;

use models::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations =
    embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            connection_timeout_sec: 30,
            max_retries: 3,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    /// Returns an error if no database URL is set.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let max_retries = std::env::var("PG_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        Ok(Self {
            database_url,
            max_pool_size,
            connection_timeout_sec,
            max_retries,
        })
    }
}

/// Postgres-backed implementation of [`SampleRepository`].
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository, build the pool, and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .build(manager)?;

        {
            let mut conn = pool.get()?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal(format!("Migration failed: {}", e))
                .with_operation("run_migrations")
        })?;
        Ok(())
    }

    /// Execute a blocking database operation on the pool, retrying
    /// transient failures with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(100);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::from(e).with_operation("get_connection");
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::Internal {
                message: format!("Task join error: {}", e),
                context: ErrorContext::new("spawn_blocking"),
            }
        })?
    }
}

#[async_trait]
impl SampleRepository for PostgresRepository {
    async fn append_samples(&self, samples: &[NewWaitSample]) -> RepositoryResult<usize> {
        let rows: Vec<NewWaitTimeRow> = samples
            .iter()
            .map(|s| NewWaitTimeRow {
                stadsloket_id: s.location_id,
                waiting: s.people_waiting,
                waittime: s.wait_minutes,
                observed_at: s.observed_at,
            })
            .collect();

        self.with_conn(move |conn| {
            use schema::wait_times::dsl::*;
            let inserted = diesel::insert_into(wait_times)
                .values(&rows)
                .execute(conn)
                .map_err(|e| {
                    RepositoryError::from(e)
                        .with_operation("append_samples")
                })?;
            Ok(inserted)
        })
        .await
    }

    async fn upsert_location_names(&self, names: &[(i32, String)]) -> RepositoryResult<usize> {
        let rows: Vec<LoketNameRow> = names
            .iter()
            .map(|(id, name)| LoketNameRow {
                stadsloket_id: *id,
                loket_name: name.clone(),
            })
            .collect();

        self.with_conn(move |conn| {
            use schema::loket_names::dsl::*;
            let upserted = diesel::insert_into(loket_names)
                .values(&rows)
                .on_conflict(stadsloket_id)
                .do_update()
                .set(loket_name.eq(excluded(loket_name)))
                .execute(conn)
                .map_err(|e| {
                    RepositoryError::from(e).with_operation("upsert_location_names")
                })?;
            Ok(upserted)
        })
        .await
    }

    async fn latest_per_location(&self) -> RepositoryResult<Vec<LatestWait>> {
        self.with_conn(|conn| {
            // Highest row id wins on equal timestamps.
            let rows: Vec<LatestWaitRow> = sql_query(
                "SELECT DISTINCT ON (stadsloket_id) \
                        stadsloket_id, waittime, waiting, observed_at \
                 FROM wait_times \
                 ORDER BY stadsloket_id, observed_at DESC, id DESC",
            )
            .load(conn)
            .map_err(|e| RepositoryError::from(e).with_operation("latest_per_location"))?;

            Ok(rows
                .into_iter()
                .map(|r| LatestWait {
                    location_id: r.stadsloket_id,
                    wait_minutes: r.waittime,
                    people_waiting: r.waiting,
                    observed_at: r.observed_at,
                })
                .collect())
        })
        .await
    }

    async fn mean_per_location(&self) -> RepositoryResult<Vec<MeanWait>> {
        self.with_conn(|conn| {
            let rows: Vec<MeanWaitRow> = sql_query(
                "SELECT stadsloket_id, AVG(waittime)::FLOAT8 AS mean_wait \
                 FROM wait_times \
                 GROUP BY stadsloket_id \
                 ORDER BY stadsloket_id",
            )
            .load(conn)
            .map_err(|e| RepositoryError::from(e).with_operation("mean_per_location"))?;

            Ok(rows
                .into_iter()
                .map(|r| MeanWait {
                    location_id: r.stadsloket_id,
                    mean_wait: r.mean_wait,
                })
                .collect())
        })
        .await
    }

    async fn hourly_averages(&self, day: Option<Weekday>) -> RepositoryResult<Vec<HourlyAverage>> {
        self.with_conn(move |conn| {
            // Postgres DOW numbering is 0=Sunday..6=Saturday, same as ours.
            let base = "SELECT stadsloket_id, \
                   CAST(EXTRACT(HOUR FROM observed_at AT TIME ZONE 'Europe/Amsterdam') AS INTEGER) AS hour, \
                   AVG(waittime)::FLOAT8 AS avg_wait \
            FROM wait_times";
            let rows: Vec<HourlyAverageRow> = match day {
                Some(weekday) => sql_query(format!(
                    "{base} \
                     WHERE CAST(EXTRACT(DOW FROM observed_at AT TIME ZONE 'Europe/Amsterdam') AS INTEGER) = $1 \
                     GROUP BY stadsloket_id, hour \
                     ORDER BY stadsloket_id, hour"
                ))
                .bind::<Integer, _>(weekday.value() as i32)
                .load(conn),
                None => sql_query(format!(
                    "{base} \
                     GROUP BY stadsloket_id, hour \
                     ORDER BY stadsloket_id, hour"
                ))
                .load(conn),
            }
            .map_err(|e| RepositoryError::from(e).with_operation("hourly_averages"))?;

            Ok(rows
                .into_iter()
                .map(|r| HourlyAverage {
                    location_id: r.stadsloket_id,
                    hour: r.hour as u8,
                    avg_wait: r.avg_wait,
                })
                .collect())
        })
        .await
    }

    async fn most_recent_timestamp(&self) -> RepositoryResult<Option<DateTime<Utc>>> {
        self.with_conn(|conn| {
            let row: MaxTimestampRow =
                sql_query("SELECT MAX(observed_at) AS max_ts FROM wait_times")
                    .get_result(conn)
                    .map_err(|e| {
                        RepositoryError::from(e).with_operation("most_recent_timestamp")
                    })?;
            Ok(row.max_ts)
        })
        .await
    }

    async fn location_names(&self) -> RepositoryResult<HashMap<i32, String>> {
        self.with_conn(|conn| {
            use schema::loket_names::dsl::*;
            let rows: Vec<LoketNameRow> = loket_names
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("location_names"))?;
            Ok(rows
                .into_iter()
                .map(|r| (r.stadsloket_id, r.loket_name))
                .collect())
        })
        .await
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            let row: CountRow = sql_query("SELECT COUNT(*) AS count FROM loket_names")
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("health_check"))?;
            Ok(row.count >= 0)
        })
        .await
    }
}
