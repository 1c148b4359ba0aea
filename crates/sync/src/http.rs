//! HTTP surface: `POST /refresh` and `GET /health`.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use confsync_client::ConfigEntry;

use crate::orchestrator::{RefreshOutcome, RefreshStage};
use crate::service::ConfigSync;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    sync: Arc<dyn ConfigSync>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    sync_enabled: bool,
}

/// Build the router.
pub fn router(sync: Arc<dyn ConfigSync>) -> Router {
    Router::new()
        .route("/refresh", post(refresh_handler))
        .route("/health", get(health_handler))
        .with_state(AppState { sync })
}

async fn refresh_handler(
    State(state): State<AppState>,
    payload: Result<Json<Vec<ConfigEntry>>, JsonRejection>,
) -> (StatusCode, Json<RefreshOutcome>) {
    if !state.sync.is_enabled() {
        tracing::warn!("Refresh requested while config sync is disabled");
        return (StatusCode::BAD_REQUEST, Json(RefreshOutcome::disabled()));
    }

    let entries = match payload {
        Ok(Json(entries)) => entries,
        Err(rejection) => {
            tracing::warn!(status = %rejection.status(), "Rejected malformed refresh request");
            return (
                rejection.status(),
                Json(RefreshOutcome::failed(RefreshStage::InvalidRequest)),
            );
        }
    };

    let outcome = state.sync.refresh(entries).await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sync_enabled: state.sync.is_enabled(),
    })
}
