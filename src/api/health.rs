use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiResponse, AppState, HealthDto};

/// GET /health
///
/// Reports 503 when the database cannot be reached.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    if let Err(e) = state.store().ping().await {
        tracing::warn!(error = %e, "Health check failed");
        let status = StatusCode::SERVICE_UNAVAILABLE;
        return (
            status,
            Json(ApiResponse::<()>::message(status, "Database unavailable")),
        )
            .into_response();
    }

    Json(ApiResponse::success(
        "OK",
        HealthDto {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            uptime: state.start_time.elapsed().as_secs(),
        },
    ))
    .into_response()
}
