//! Repository trait for the wait-sample store.
//!
//! The aggregation engine is the sole consumer of the read-side queries;
//! the collector is the sole writer. Reads never mutate anything.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{HourlyAverage, LatestWait, MeanWait, NewWaitSample, Weekday};

/// Repository trait for wait-time samples and location names.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SampleRepository: Send + Sync {
    // ==================== Write side (collector only) ====================

    /// Append a batch of samples to the log.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows inserted
    async fn append_samples(&self, samples: &[NewWaitSample]) -> RepositoryResult<usize>;

    /// Insert-or-replace location names by id.
    ///
    /// Upserting an identical pair is a no-op on content, so the periodic
    /// name refresh is idempotent.
    async fn upsert_location_names(&self, names: &[(i32, String)]) -> RepositoryResult<usize>;

    // ==================== Read side (aggregation engine) ====================

    /// The single most recent sample per location.
    ///
    /// When two samples for one location share an exact timestamp, the
    /// one with the highest row id wins.
    async fn latest_per_location(&self) -> RepositoryResult<Vec<LatestWait>>;

    /// Arithmetic mean of normalized wait minutes over the full history,
    /// per location.
    async fn mean_per_location(&self) -> RepositoryResult<Vec<MeanWait>>;

    /// Average wait per `(location, hour-of-day)` bucket in Amsterdam
    /// local time, optionally restricted to one weekday (0=Sunday).
    ///
    /// Only buckets with at least one sample are returned; the
    /// aggregation service fills the chart axis.
    async fn hourly_averages(&self, day: Option<Weekday>) -> RepositoryResult<Vec<HourlyAverage>>;

    /// Timestamp of the most recent sample, if any.
    async fn most_recent_timestamp(&self) -> RepositoryResult<Option<DateTime<Utc>>>;

    /// All known location names keyed by id.
    async fn location_names(&self) -> RepositoryResult<HashMap<i32, String>>;

    /// Verify the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
