//! HTTP API module for the BusTime aggregator
//!
//! Thin serving layer over [`RouteDataService`]; handlers only call
//! `get_route_data` / `known_routes` and translate errors to status codes.
//!
//! # Endpoints
//! - `GET /health` — health check
//! - `GET /api/routes` — known route list
//! - `GET /api/routes/{id}` — merged route view

pub mod handlers;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::bustime::BusTimeApi;
use crate::config::Config;
use crate::service::RouteDataService;

/// Application state shared with endpoints
pub struct AppState<C: BusTimeApi> {
    pub config: Config,
    pub service: Arc<RouteDataService<C>>,
}

/// Creates the main Axum router with all endpoints
pub fn create_router<C: BusTimeApi>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/routes", get(handlers::list_routes::<C>))
        .route("/api/routes/{id}", get(handlers::route_data::<C>))
        .with_state(state)
}
