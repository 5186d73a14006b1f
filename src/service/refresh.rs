// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Background real-time refresh loop
//!
//! Periodically refetches real-time data for recently-requested routes and
//! swaps the real-time store wholesale. Failures are logged and the
//! previous store contents retained; the serving path never sees them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::RouteDataService;
use crate::bustime::BusTimeApi;

/// Starts the background refresh loop
///
/// Runs one refresh cycle every `interval` until the shutdown signal fires.
pub fn start_refresh_loop<C: BusTimeApi>(
    service: Arc<RouteDataService<C>>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tracing::info!(
        "Starting background refresh loop every {}s",
        interval.as_secs()
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {},
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Stopping refresh loop");
                        break;
                    }
                }
            }

            let start = std::time::Instant::now();
            match service.refresh_tracked().await {
                Ok(refreshed) => {
                    tracing::debug!(
                        "Refreshed real-time data for {} route(s) in {:.3}s",
                        refreshed,
                        start.elapsed().as_secs_f64()
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Real-time refresh failed in {:.3}s, keeping previous data: {}",
                        start.elapsed().as_secs_f64(),
                        e
                    );
                }
            }
        }
    })
}
