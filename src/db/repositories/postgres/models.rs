use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Double, Int4, Int8, Nullable, Timestamptz};

use super::schema::{loket_names, wait_times};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wait_times)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct WaitTimeRow {
    pub id: i64,
    pub stadsloket_id: i32,
    pub waiting: Option<i32>,
    pub waittime: i32,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wait_times)]
pub struct NewWaitTimeRow {
    pub stadsloket_id: i32,
    pub waiting: Option<i32>,
    pub waittime: i32,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = loket_names)]
pub struct LoketNameRow {
    pub stadsloket_id: i32,
    pub loket_name: String,
}

/// Row shape for the `DISTINCT ON` latest-per-location query.
#[derive(Debug, QueryableByName)]
pub struct LatestWaitRow {
    #[diesel(sql_type = Int4)]
    pub stadsloket_id: i32,
    #[diesel(sql_type = Int4)]
    pub waittime: i32,
    #[diesel(sql_type = Nullable<Int4>)]
    pub waiting: Option<i32>,
    #[diesel(sql_type = Timestamptz)]
    pub observed_at: DateTime<Utc>,
}

/// Row shape for the mean-per-location aggregate.
#[derive(Debug, QueryableByName)]
pub struct MeanWaitRow {
    #[diesel(sql_type = Int4)]
    pub stadsloket_id: i32,
    #[diesel(sql_type = Double)]
    pub mean_wait: f64,
}

/// Row shape for the hourly-average aggregate.
#[derive(Debug, QueryableByName)]
pub struct HourlyAverageRow {
    #[diesel(sql_type = Int4)]
    pub stadsloket_id: i32,
    #[diesel(sql_type = Int4)]
    pub hour: i32,
    #[diesel(sql_type = Double)]
    pub avg_wait: f64,
}

/// Row shape for the most-recent-timestamp query.
#[derive(Debug, QueryableByName)]
pub struct MaxTimestampRow {
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub max_ts: Option<DateTime<Utc>>,
}

/// Row shape for `SELECT count(*)` health probes.
#[derive(Debug, QueryableByName)]
pub struct CountRow {
    #[diesel(sql_type = Int8)]
    pub count: i64,
}
