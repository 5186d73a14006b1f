// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! # BusTime Aggregator
//!
//! Aggregates real-time and static CTA bus data from the rate-limited
//! BusTime API and serves it per route over HTTP.
//!
//! The core is the freshness and batching layer: it decides when cached
//! data is reusable, splits entity lookups into upstream-compliant request
//! batches, and merges fast-changing vehicle/prediction data with
//! rarely-changing pattern/direction/stop data into one view per route.
//!
//! ## Main modules
//! - `api`: HTTP API handlers
//! - `batch`: request batching and orchestrated fan-out
//! - `bustime`: BusTime API client and wire contract
//! - `config`: configuration management
//! - `error`: error types
//! - `model`: domain entities
//! - `service`: caches, recency tracking and the refresh loop
//! - `prelude`: commonly used types and traits

mod api;
mod batch;
mod bustime;
mod config;
mod error;
mod model;
mod service;
pub mod prelude;

// Re-export commonly used types
/// Application configuration
pub use config::Config;

/// Application error and result type
pub use error::{AppError, Result};

/// HTTP API router and state
pub use api::{AppState, create_router};

/// BusTime API seam and live client
pub use bustime::{BusTimeApi, BusTimeClient};

/// Batching primitives and the upstream request limit
pub use batch::{MAX_BATCH_SIZE, ensure_batch_size, fetch_in_batches, split};

/// Domain entities
pub use model::{
    EvergreenRouteRecord, MergedRouteView, Pattern, Point, Prediction, RealTimeRouteRecord,
    RouteMetadata, Stop, Vehicle,
};

/// Route data service and refresh loop
pub use service::{RouteDataService, start_refresh_loop};
