//! Health and maintenance routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/initialize-system", post(initialize_system))
        .route("/initialize", post(initialize_system))
}

/// GET /health — lifecycle state and snapshot size.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!(state.service.health()))
}

/// POST /initialize-system — regenerate artifacts and reload.
pub async fn initialize_system(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    info!(
        "Re-initializing assets under {}",
        state.config.asset_paths.root.display()
    );
    let worker = state.clone();
    let result = tokio::task::spawn_blocking(move || worker.service.force_reinitialize()).await;

    match result {
        Ok(Ok(nodes)) => {
            info!("System re-initialized: {} nodes", nodes);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "SUCCESS",
                    "message": "System re-initialized with regenerated assets.",
                    "nodes_count": nodes,
                })),
            )
        }
        Ok(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "status": "FAILED",
                "error": e.to_string(),
            })),
        ),
        Err(e) => {
            error!("Reinitialization task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "FAILED",
                    "error": "reinitialization task failed",
                })),
            )
        }
    }
}
