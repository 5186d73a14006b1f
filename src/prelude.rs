// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for convenient use.
//! Users of the library can import everything they need with:
//!
//! ```rust
//! use bustime_aggregator::prelude::*;
//! ```

// Core types
pub use crate::config::Config;
pub use crate::error::{AppError, Result};

// Domain entities
pub use crate::model::{
    EvergreenRouteRecord, MergedRouteView, Pattern, Point, Prediction, RealTimeRouteRecord,
    RouteMetadata, Stop, Vehicle,
};

// BusTime client and service
pub use crate::bustime::{BusTimeApi, BusTimeClient};
pub use crate::service::{RouteDataService, start_refresh_loop};

// Batching
pub use crate::batch::{MAX_BATCH_SIZE, fetch_in_batches, split};
