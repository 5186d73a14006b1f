// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Per-route cache of rarely-changing route data
//!
//! Directions, patterns and stops are fetched once per route and reused for
//! the process lifetime. Two concurrent misses for the same route may both
//! fetch; the last writer wins, which is fine because the data is
//! idempotent upstream.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::try_join_all;
use tokio::sync::RwLock;

use crate::bustime::BusTimeApi;
use crate::error::{AppError, Result};
use crate::model::EvergreenRouteRecord;

/// Route id -> evergreen record, cached forever within the process
#[derive(Default)]
pub(crate) struct EvergreenStore {
    records: RwLock<HashMap<String, Arc<EvergreenRouteRecord>>>,
}

impl EvergreenStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn get(&self, route_id: &str) -> Option<Arc<EvergreenRouteRecord>> {
        let records = self.records.read().await;
        records.get(route_id).cloned()
    }

    pub(crate) async fn insert(&self, route_id: &str, record: Arc<EvergreenRouteRecord>) {
        let mut records = self.records.write().await;
        tracing::debug!("Cached evergreen record for route {}", route_id);
        records.insert(route_id.to_string(), record);
    }
}

/// Fetches a route's evergreen record from the upstream.
///
/// The direction list comes first because the stop requests are scoped per
/// direction; patterns and all per-direction stop lists are then fetched
/// concurrently.
pub(super) async fn fetch_evergreen<C: BusTimeApi>(
    api: &C,
    route_id: &str,
) -> Result<EvergreenRouteRecord> {
    let directions = api.fetch_directions(route_id).await?;

    let patterns_fut = api.fetch_patterns(route_id);
    let stops_fut = try_join_all(directions.iter().map(|direction| async move {
        let stops = api.fetch_stops(route_id, direction).await?;
        Ok::<_, AppError>((direction.clone(), stops))
    }));

    let (patterns, stops) = tokio::try_join!(patterns_fut, stops_fut)?;

    Ok(EvergreenRouteRecord {
        directions,
        patterns,
        stops_by_direction: stops.into_iter().collect(),
    })
}
