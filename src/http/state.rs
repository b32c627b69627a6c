//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::SampleRepository;
use crate::services::{Geocoder, TravelEstimator};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for store operations
    pub repository: Arc<dyn SampleRepository>,
    /// Travel estimator with its time-bucketed cache
    pub travel: Arc<TravelEstimator>,
    /// Postcode geocoder with its process-lifetime cache
    pub geocoder: Arc<Geocoder>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        repository: Arc<dyn SampleRepository>,
        travel: Arc<TravelEstimator>,
        geocoder: Arc<Geocoder>,
    ) -> Self {
        Self {
            repository,
            travel,
            geocoder,
        }
    }
}
