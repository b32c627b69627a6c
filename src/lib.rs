//! # Wachtrij Backend
//!
//! Wait-time tracking backend for the Amsterdam city-office service desks.
//!
//! This crate polls the public wait-time feed for the stadsloketten, stores
//! every normalized reading as an append-only sample, and exposes a REST API
//! with current waits, historical charts, and travel-aware ranking of
//! offices from a user location.
//!
//! ## Features
//!
//! - **Collection**: Periodic polling of the upstream JSON feed, with a
//!   normalizer that maps free-form wait strings to minutes
//! - **Aggregation**: Current waits, all-time means, and hourly averages
//!   per weekday, bucketed on the Amsterdam wall clock
//! - **Ranking**: Combined wait-plus-cycling-time ordering of offices,
//!   with a routing provider and a great-circle fallback
//! - **Geocoding**: Strictly validated Dutch postcode resolution
//! - **HTTP API**: RESTful endpoints for the chart frontend
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Domain types, the wait normalizer, the office catalog
//! - [`db`]: Repository pattern and persistence layer
//! - [`services`]: Aggregation, ranking, travel, geocoding, and the
//!   background collector and keepalive tasks
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
