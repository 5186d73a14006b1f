// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Cache of fast-changing vehicle and prediction data
//!
//! Records are only ever replaced wholesale: the on-demand path swaps one
//! route's record, the refresh path swaps the entire map. Readers see the
//! old or the new state, never a mix.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::batch::{MAX_BATCH_SIZE, fetch_in_batches};
use crate::bustime::BusTimeApi;
use crate::error::Result;
use crate::model::{Prediction, RealTimeRouteRecord, RouteMetadata, Vehicle};

/// Route id -> latest real-time record
#[derive(Default)]
pub(crate) struct RealTimeStore {
    records: RwLock<HashMap<String, Arc<RealTimeRouteRecord>>>,
}

impl RealTimeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn get(&self, route_id: &str) -> Option<Arc<RealTimeRouteRecord>> {
        let records = self.records.read().await;
        records.get(route_id).cloned()
    }

    pub(crate) async fn insert(&self, route_id: &str, record: Arc<RealTimeRouteRecord>) {
        let mut records = self.records.write().await;
        records.insert(route_id.to_string(), record);
    }

    /// Swaps the whole store for a fresh result set.
    ///
    /// Entries for routes absent from `fresh` are dropped, intentionally:
    /// the refresh cycle owns the full set of routes worth keeping.
    pub(crate) async fn replace_all(&self, fresh: HashMap<String, Arc<RealTimeRouteRecord>>) {
        let mut records = self.records.write().await;
        *records = fresh;
    }
}

/// Fetches fresh real-time records for `route_ids` in one orchestrated pass:
/// vehicles for all routes, then predictions for all their vehicles, each
/// fanned out in upstream-compliant batches.
///
/// Every requested route gets a record, with an empty vehicle list when
/// nothing is on the street. All-or-nothing: any batch failure fails the
/// whole call and nothing is returned.
pub(super) async fn fetch_real_time<C: BusTimeApi>(
    api: &C,
    known_routes: &HashMap<String, RouteMetadata>,
    route_ids: &[String],
) -> Result<HashMap<String, Arc<RealTimeRouteRecord>>> {
    let vehicles = fetch_in_batches(route_ids, MAX_BATCH_SIZE, |batch| async move {
        api.fetch_vehicles(&batch).await
    })
    .await?;

    let vehicle_ids: Vec<String> = vehicles.iter().map(|v| v.vehicle_id.clone()).collect();
    let predictions = fetch_in_batches(&vehicle_ids, MAX_BATCH_SIZE, |batch| async move {
        api.fetch_predictions(&batch).await
    })
    .await?;

    let vehicles = attach_predictions(vehicles, predictions);

    let mut by_route: HashMap<String, Vec<Vehicle>> = HashMap::new();
    for vehicle in vehicles {
        by_route
            .entry(vehicle.route_id.clone())
            .or_default()
            .push(vehicle);
    }

    let mut records = HashMap::with_capacity(route_ids.len());
    for route_id in route_ids {
        let name = known_routes
            .get(route_id)
            .map(|meta| meta.name.clone())
            .unwrap_or_default();
        let record = RealTimeRouteRecord {
            route_id: route_id.clone(),
            name,
            vehicles: by_route.remove(route_id).unwrap_or_default(),
        };
        records.insert(route_id.clone(), Arc::new(record));
    }
    Ok(records)
}

/// Gives each vehicle exactly the predictions whose `vehicle_id` matches
fn attach_predictions(vehicles: Vec<Vehicle>, predictions: Vec<Prediction>) -> Vec<Vehicle> {
    let mut by_vehicle: HashMap<String, Vec<Prediction>> = HashMap::new();
    for prediction in predictions {
        by_vehicle
            .entry(prediction.vehicle_id.clone())
            .or_default()
            .push(prediction);
    }

    vehicles
        .into_iter()
        .map(|mut vehicle| {
            vehicle.predictions = by_vehicle.remove(&vehicle.vehicle_id).unwrap_or_default();
            vehicle
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(id: &str, route: &str) -> Vehicle {
        Vehicle {
            vehicle_id: id.to_string(),
            timestamp: String::new(),
            lat: String::new(),
            lon: String::new(),
            heading: String::new(),
            pattern_id: 0,
            route_id: route.to_string(),
            destination: String::new(),
            distance_along_pattern: 0,
            delayed: false,
            trip_id: String::new(),
            orig_trip_no: String::new(),
            block_id: String::new(),
            zone: String::new(),
            predictions: Vec::new(),
        }
    }

    fn prediction(vid: &str, stop: &str) -> Prediction {
        Prediction {
            timestamp: String::new(),
            kind: "A".to_string(),
            stop_id: stop.to_string(),
            stop_name: String::new(),
            vehicle_id: vid.to_string(),
            distance_to_stop: 0,
            route_id: "74".to_string(),
            direction: String::new(),
            destination: String::new(),
            predicted_time: String::new(),
            delayed: false,
            countdown: String::new(),
            zone: String::new(),
        }
    }

    #[test]
    fn test_attach_predictions_matches_by_vehicle_id() {
        let vehicles = vec![vehicle("4001", "74"), vehicle("4002", "74")];
        let predictions = vec![
            prediction("4001", "100"),
            prediction("4002", "200"),
            prediction("4001", "101"),
        ];

        let attached = attach_predictions(vehicles, predictions);
        assert_eq!(attached[0].predictions.len(), 2);
        assert!(
            attached[0]
                .predictions
                .iter()
                .all(|p| p.vehicle_id == "4001")
        );
        assert_eq!(attached[1].predictions.len(), 1);
        assert_eq!(attached[1].predictions[0].stop_id, "200");
    }

    #[test]
    fn test_attach_predictions_unmatched_vehicle_gets_empty() {
        let vehicles = vec![vehicle("4001", "74")];
        let attached = attach_predictions(vehicles, vec![prediction("9999", "100")]);
        assert!(attached[0].predictions.is_empty());
    }

    #[tokio::test]
    async fn test_replace_all_drops_absent_routes() {
        let store = RealTimeStore::new();
        store
            .insert(
                "74",
                Arc::new(RealTimeRouteRecord {
                    route_id: "74".to_string(),
                    name: "Fullerton".to_string(),
                    vehicles: Vec::new(),
                }),
            )
            .await;

        let fresh = HashMap::from([(
            "76".to_string(),
            Arc::new(RealTimeRouteRecord {
                route_id: "76".to_string(),
                name: "Diversey".to_string(),
                vehicles: Vec::new(),
            }),
        )]);
        store.replace_all(fresh).await;

        assert!(store.get("74").await.is_none());
        assert!(store.get("76").await.is_some());
    }
}
