use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::bustime::BusTimeApi;
use crate::error::AppError;
use crate::model::RouteMetadata;

/// Error body returned by route endpoints
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// GET /api/routes
///
/// Lists every route in the known route set, sorted by id.
pub async fn list_routes<C: BusTimeApi>(
    State(state): State<Arc<AppState<C>>>,
) -> Json<Vec<RouteMetadata>> {
    Json(state.service.known_routes())
}

/// GET /api/routes/{id}
///
/// Returns the merged evergreen + real-time view for one route.
pub async fn route_data<C: BusTimeApi>(
    State(state): State<Arc<AppState<C>>>,
    Path(route_id): Path<String>,
) -> Response {
    match state.service.get_route_data(&route_id).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => {
            let status = match &e {
                AppError::InvalidRoute(_) => StatusCode::NOT_FOUND,
                AppError::Upstream(_) => {
                    tracing::error!("Failed to serve route {}: {}", route_id, e);
                    StatusCode::BAD_GATEWAY
                }
                other => {
                    tracing::error!("Unexpected error serving route {}: {}", route_id, other);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
