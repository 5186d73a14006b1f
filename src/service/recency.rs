// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Tracks which routes were requested recently
//!
//! The background refresher only refreshes routes whose last access falls
//! inside the freshness window; everything older is pruned lazily before
//! each cycle.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Route id -> last-access timestamp
#[derive(Default)]
pub(crate) struct RecencyTracker {
    entries: Mutex<HashMap<String, Instant>>,
}

impl RecencyTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records an access to `route_id` at the current instant
    pub(crate) async fn touch(&self, route_id: &str) {
        let mut entries = self.entries.lock().await;
        entries.insert(route_id.to_string(), Instant::now());
    }

    /// Drops entries whose last access is older than `window`, returning
    /// how many were removed
    pub(crate) async fn prune(&self, window: Duration) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, last_access| last_access.elapsed() <= window);
        before - entries.len()
    }

    /// Currently tracked route ids, sorted for deterministic batching
    pub(crate) async fn tracked(&self) -> Vec<String> {
        let entries = self.entries.lock().await;
        let mut ids: Vec<String> = entries.keys().cloned().collect();
        ids.sort();
        ids
    }
}
