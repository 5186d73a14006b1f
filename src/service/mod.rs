// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Route data service: validation, cache coherence and merging
//!
//! Owns the evergreen store, the real-time store and the recency tracker.
//! Serving handlers call [`RouteDataService::get_route_data`]; the
//! background loop in [`refresh`] calls [`RouteDataService::refresh_tracked`].

mod evergreen;
mod realtime;
mod recency;
mod refresh;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::bustime::BusTimeApi;
use crate::error::{AppError, Result};
use crate::model::{EvergreenRouteRecord, MergedRouteView, RouteMetadata};

use evergreen::{EvergreenStore, fetch_evergreen};
use realtime::{RealTimeStore, fetch_real_time};
use recency::RecencyTracker;

pub use refresh::start_refresh_loop;

/// The single owner of all cached route state
pub struct RouteDataService<C: BusTimeApi> {
    api: C,
    known_routes: HashMap<String, RouteMetadata>,
    evergreen: EvergreenStore,
    real_time: RealTimeStore,
    recency: RecencyTracker,
    recency_window: Duration,
}

impl<C: BusTimeApi> RouteDataService<C> {
    /// Builds the service around the startup-loaded known route set
    pub fn new(api: C, routes: Vec<RouteMetadata>, recency_window: Duration) -> Self {
        let known_routes = routes
            .into_iter()
            .map(|meta| (meta.id.clone(), meta))
            .collect();
        Self {
            api,
            known_routes,
            evergreen: EvergreenStore::new(),
            real_time: RealTimeStore::new(),
            recency: RecencyTracker::new(),
            recency_window,
        }
    }

    /// Known routes sorted by id, for the route listing endpoint
    pub fn known_routes(&self) -> Vec<RouteMetadata> {
        let mut routes: Vec<RouteMetadata> = self.known_routes.values().cloned().collect();
        routes.sort_by(|a, b| a.id.cmp(&b.id));
        routes
    }

    /// Returns the merged evergreen + real-time view for one route.
    ///
    /// Cache hit: touch the recency entry and merge the cached records.
    /// Cache miss: fetch real-time and evergreen concurrently, cache both
    /// only when both succeed, then merge. A failed fetch leaves the caches
    /// untouched.
    ///
    /// # Errors
    ///
    /// `InvalidRoute` when `route_id` is not in the known route set,
    /// `Upstream` when any required fetch fails.
    pub async fn get_route_data(&self, route_id: &str) -> Result<MergedRouteView> {
        if !self.known_routes.contains_key(route_id) {
            return Err(AppError::InvalidRoute(route_id.to_string()));
        }

        if let Some(real_time) = self.real_time.get(route_id).await {
            self.recency.touch(route_id).await;
            let evergreen = self.evergreen_for(route_id).await?;
            return Ok(MergedRouteView::merge(&evergreen, &real_time));
        }

        self.recency.touch(route_id).await;

        let route_ids = [route_id.to_string()];
        let (mut fresh, evergreen) = tokio::try_join!(
            fetch_real_time(&self.api, &self.known_routes, &route_ids),
            fetch_evergreen(&self.api, route_id)
        )?;

        // fetch_real_time returns a record per requested route
        let real_time = fresh
            .remove(route_id)
            .ok_or_else(|| AppError::Upstream(format!("missing record for route {route_id}")))?;
        let evergreen = Arc::new(evergreen);

        self.evergreen.insert(route_id, evergreen.clone()).await;
        self.real_time.insert(route_id, real_time.clone()).await;

        Ok(MergedRouteView::merge(&evergreen, &real_time))
    }

    /// One background refresh cycle: prune stale recency entries, refetch
    /// real-time data for the remaining routes, swap the store atomically.
    ///
    /// Returns the number of routes refreshed. On failure the previous
    /// store contents are retained and the error is surfaced to the loop,
    /// which logs it; nothing here ever reaches a serving caller.
    pub async fn refresh_tracked(&self) -> Result<usize> {
        let pruned = self.recency.prune(self.recency_window).await;
        if pruned > 0 {
            tracing::debug!("Pruned {} stale recency entries", pruned);
        }

        let tracked = self.recency.tracked().await;
        if tracked.is_empty() {
            self.real_time.replace_all(HashMap::new()).await;
            return Ok(0);
        }

        let fresh = fetch_real_time(&self.api, &self.known_routes, &tracked).await?;
        let refreshed = fresh.len();
        self.real_time.replace_all(fresh).await;
        Ok(refreshed)
    }

    async fn evergreen_for(&self, route_id: &str) -> Result<Arc<EvergreenRouteRecord>> {
        if let Some(record) = self.evergreen.get(route_id).await {
            return Ok(record);
        }
        let record = Arc::new(fetch_evergreen(&self.api, route_id).await?);
        self.evergreen.insert(route_id, record.clone()).await;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pattern, Prediction, Stop, Vehicle};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory BusTime fake with per-endpoint call counters
    #[derive(Default)]
    struct MockApi {
        vehicles: Vec<Vehicle>,
        predictions: Vec<Prediction>,
        fail_vehicles: AtomicBool,
        vehicles_calls: AtomicUsize,
        predictions_calls: AtomicUsize,
        directions_calls: AtomicUsize,
        patterns_calls: AtomicUsize,
        stops_calls: AtomicUsize,
    }

    fn meta(id: &str, name: &str) -> RouteMetadata {
        RouteMetadata {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn vehicle(id: &str, route: &str) -> Vehicle {
        Vehicle {
            vehicle_id: id.to_string(),
            timestamp: "20260831 12:00".to_string(),
            lat: "41.9".to_string(),
            lon: "-87.6".to_string(),
            heading: "90".to_string(),
            pattern_id: 5342,
            route_id: route.to_string(),
            destination: "Lake Shore Dr".to_string(),
            distance_along_pattern: 100,
            delayed: false,
            trip_id: String::new(),
            orig_trip_no: String::new(),
            block_id: String::new(),
            zone: String::new(),
            predictions: Vec::new(),
        }
    }

    fn prediction(vid: &str) -> Prediction {
        Prediction {
            timestamp: String::new(),
            kind: "A".to_string(),
            stop_id: "14787".to_string(),
            stop_name: "Fullerton & Ashland".to_string(),
            vehicle_id: vid.to_string(),
            distance_to_stop: 450,
            route_id: "74".to_string(),
            direction: "Eastbound".to_string(),
            destination: "Lake Shore Dr".to_string(),
            predicted_time: String::new(),
            delayed: false,
            countdown: "5".to_string(),
            zone: String::new(),
        }
    }

    #[async_trait]
    impl BusTimeApi for MockApi {
        async fn fetch_all_routes(&self) -> Result<Vec<RouteMetadata>> {
            Ok(vec![meta("74", "Fullerton"), meta("76", "Diversey")])
        }

        async fn fetch_vehicles(&self, route_ids: &[String]) -> Result<Vec<Vehicle>> {
            self.vehicles_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_vehicles.load(Ordering::SeqCst) {
                return Err(AppError::Upstream("vehicles endpoint down".to_string()));
            }
            Ok(self
                .vehicles
                .iter()
                .filter(|v| route_ids.contains(&v.route_id))
                .cloned()
                .collect())
        }

        async fn fetch_predictions(&self, vehicle_ids: &[String]) -> Result<Vec<Prediction>> {
            self.predictions_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .predictions
                .iter()
                .filter(|p| vehicle_ids.contains(&p.vehicle_id))
                .cloned()
                .collect())
        }

        async fn fetch_directions(&self, _route_id: &str) -> Result<Vec<String>> {
            self.directions_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["Eastbound".to_string(), "Westbound".to_string()])
        }

        async fn fetch_patterns(&self, _route_id: &str) -> Result<Vec<Pattern>> {
            self.patterns_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Pattern {
                pattern_id: 5342,
                length: 4521,
                direction_label: "Eastbound".to_string(),
                points: Vec::new(),
            }])
        }

        async fn fetch_stops(&self, _route_id: &str, direction: &str) -> Result<Vec<Stop>> {
            self.stops_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Stop {
                stop_id: format!("stop-{direction}"),
                name: direction.to_string(),
                lat: 41.9,
                lon: -87.6,
            }])
        }
    }

    fn service_with(api: MockApi) -> RouteDataService<MockApi> {
        RouteDataService::new(
            api,
            vec![meta("74", "Fullerton"), meta("76", "Diversey")],
            Duration::from_secs(600),
        )
    }

    #[tokio::test]
    async fn test_merged_view_has_evergreen_and_real_time_keys() {
        let api = MockApi {
            vehicles: vec![vehicle("4001", "74"), vehicle("4002", "74")],
            predictions: vec![prediction("4001"), prediction("4002"), prediction("4001")],
            ..MockApi::default()
        };
        let service = service_with(api);

        let view = service.get_route_data("74").await.unwrap();
        assert_eq!(view.id, "74");
        assert_eq!(view.name, "Fullerton");
        assert_eq!(view.directions, vec!["Eastbound", "Westbound"]);
        assert_eq!(view.patterns.len(), 1);
        assert_eq!(view.stops_by_direction.len(), 2);
        assert_eq!(view.vehicles.len(), 2);

        // Each vehicle carries exactly its own predictions
        for v in &view.vehicles {
            assert!(v.predictions.iter().all(|p| p.vehicle_id == v.vehicle_id));
        }
        let v1 = view
            .vehicles
            .iter()
            .find(|v| v.vehicle_id == "4001")
            .unwrap();
        assert_eq!(v1.predictions.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_route_is_invalid() {
        let service = service_with(MockApi::default());
        let err = service.get_route_data("999").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRoute(id) if id == "999"));
    }

    #[tokio::test]
    async fn test_route_appears_in_recency_after_request() {
        let service = service_with(MockApi::default());
        service.get_route_data("74").await.unwrap();
        assert_eq!(service.recency.tracked().await, vec!["74"]);
    }

    #[tokio::test]
    async fn test_repeated_requests_fetch_evergreen_once() {
        let service = service_with(MockApi::default());
        for _ in 0..5 {
            service.get_route_data("74").await.unwrap();
        }
        assert_eq!(service.api.directions_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.api.patterns_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.api.stops_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_caches_untouched() {
        let api = MockApi::default();
        api.fail_vehicles.store(true, Ordering::SeqCst);
        let service = service_with(api);

        let err = service.get_route_data("74").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert!(service.real_time.get("74").await.is_none());
        assert!(service.evergreen.get("74").await.is_none());

        // Upstream recovers; the next call succeeds and caches
        service.api.fail_vehicles.store(false, Ordering::SeqCst);
        service.get_route_data("74").await.unwrap();
        assert!(service.real_time.get("74").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_route_pruned_and_dropped_by_refresh() {
        let service = service_with(MockApi::default());
        service.get_route_data("74").await.unwrap();

        tokio::time::advance(Duration::from_secs(601)).await;
        let refreshed = service.refresh_tracked().await.unwrap();

        assert_eq!(refreshed, 0);
        assert!(service.recency.tracked().await.is_empty());
        assert!(service.real_time.get("74").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_keeps_fresh_route_drops_stale_one() {
        let service = service_with(MockApi::default());
        service.get_route_data("74").await.unwrap();

        tokio::time::advance(Duration::from_secs(400)).await;
        service.get_route_data("76").await.unwrap();

        tokio::time::advance(Duration::from_secs(300)).await;
        let refreshed = service.refresh_tracked().await.unwrap();

        assert_eq!(refreshed, 1);
        assert!(service.real_time.get("74").await.is_none());
        assert!(service.real_time.get("76").await.is_some());
    }

    #[tokio::test]
    async fn test_refresh_failure_retains_previous_store() {
        let service = service_with(MockApi::default());
        service.get_route_data("74").await.unwrap();

        service.api.fail_vehicles.store(true, Ordering::SeqCst);
        let err = service.refresh_tracked().await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert!(service.real_time.get("74").await.is_some());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_vehicle_refetch() {
        let service = service_with(MockApi::default());
        service.get_route_data("74").await.unwrap();
        let calls_after_miss = service.api.vehicles_calls.load(Ordering::SeqCst);

        service.get_route_data("74").await.unwrap();
        assert_eq!(
            service.api.vehicles_calls.load(Ordering::SeqCst),
            calls_after_miss
        );
    }

    #[test]
    fn test_known_routes_sorted() {
        let service = service_with(MockApi::default());
        let routes = service.known_routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].id, "74");
        assert_eq!(routes[1].id, "76");
    }
}
