//! Service layer for business logic and orchestration.
//!
//! Services sit between the sample store and the HTTP handlers: the
//! aggregation and ranking engines are pure reads, the travel estimator
//! and geocoder wrap external lookups behind caches, and the collector
//! and keepalive tasks drive the periodic background work.

pub mod aggregation;
pub mod collector;
pub mod geocode;
pub mod keepalive;
pub mod polyline;
pub mod ranking;
pub mod travel;

pub use aggregation::{current_waits, hourly_profile, mean_waits, CurrentWait, HourlyProfile};
pub use collector::{collect_once, run_collector, CollectorConfig};
pub use geocode::{GeocodeConfig, GeocodeError, Geocoder};
pub use keepalive::{run_keepalive, KeepaliveConfig};
pub use ranking::{best_by_wait, rank_combined, RankedLocation};
pub use travel::{TravelConfig, TravelEstimator};
