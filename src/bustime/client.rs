//! High-level BusTime API client
//!
//! Speaks the CTA Bus Tracker v2 HTTP API. Every request carries the API
//! key and `format=json`, and decodes through the wire structs in
//! [`super::types`].

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::types::{
    DirectionsBody, Envelope, PatternsBody, PredictionsBody, RoutesBody, StopsBody, VehiclesBody,
};
use crate::batch::{MAX_BATCH_SIZE, ensure_batch_size};
use crate::config::Config;
use crate::error::Result;
use crate::model::{Pattern, Prediction, RouteMetadata, Stop, Vehicle};

/// Seam between the caching layer and the upstream transport.
///
/// The service is generic over this trait so tests can run against an
/// in-memory fake instead of the live API.
#[async_trait]
pub trait BusTimeApi: Send + Sync + 'static {
    /// Full route table; called once at startup to build the known route set
    async fn fetch_all_routes(&self) -> Result<Vec<RouteMetadata>>;

    /// Vehicles for up to [`MAX_BATCH_SIZE`] routes, predictions not attached
    async fn fetch_vehicles(&self, route_ids: &[String]) -> Result<Vec<Vehicle>>;

    /// Predictions for up to [`MAX_BATCH_SIZE`] vehicles
    async fn fetch_predictions(&self, vehicle_ids: &[String]) -> Result<Vec<Prediction>>;

    /// Direction labels for one route
    async fn fetch_directions(&self, route_id: &str) -> Result<Vec<String>>;

    /// Patterns (with point geometry) for one route
    async fn fetch_patterns(&self, route_id: &str) -> Result<Vec<Pattern>>;

    /// Stops for one route and direction
    async fn fetch_stops(&self, route_id: &str, direction: &str) -> Result<Vec<Stop>>;
}

/// BusTime v2 API client backed by `reqwest`
pub struct BusTimeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BusTimeClient {
    /// Creates a client with the per-request timeout from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::trace!("GET {} {:?}", endpoint, params);

        let response = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("format", "json")])
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.inner)
    }
}

#[async_trait]
impl BusTimeApi for BusTimeClient {
    async fn fetch_all_routes(&self) -> Result<Vec<RouteMetadata>> {
        let body: RoutesBody = self.get("getroutes", &[]).await?;
        body.into_routes()
    }

    async fn fetch_vehicles(&self, route_ids: &[String]) -> Result<Vec<Vehicle>> {
        ensure_batch_size(route_ids.len(), MAX_BATCH_SIZE)?;
        let rt = route_ids.join(",");
        let body: VehiclesBody = self.get("getvehicles", &[("rt", rt.as_str())]).await?;
        body.into_vehicles()
    }

    async fn fetch_predictions(&self, vehicle_ids: &[String]) -> Result<Vec<Prediction>> {
        ensure_batch_size(vehicle_ids.len(), MAX_BATCH_SIZE)?;
        let vid = vehicle_ids.join(",");
        let body: PredictionsBody = self.get("getpredictions", &[("vid", vid.as_str())]).await?;
        body.into_predictions()
    }

    async fn fetch_directions(&self, route_id: &str) -> Result<Vec<String>> {
        let body: DirectionsBody = self.get("getdirections", &[("rt", route_id)]).await?;
        body.into_directions()
    }

    async fn fetch_patterns(&self, route_id: &str) -> Result<Vec<Pattern>> {
        let body: PatternsBody = self.get("getpatterns", &[("rt", route_id)]).await?;
        body.into_patterns()
    }

    async fn fetch_stops(&self, route_id: &str, direction: &str) -> Result<Vec<Stop>> {
        let body: StopsBody = self
            .get("getstops", &[("rt", route_id), ("dir", direction)])
            .await?;
        body.into_stops()
    }
}
