//! Transaction risk scoring route.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tracing::error;

use super::error_response;
use crate::state::AppState;
use mulehunter_graph::TransactionRequest;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/analyze-transaction", post(analyze_transaction))
}

/// POST /analyze-transaction — score the source account of a transaction.
pub async fn analyze_transaction(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> (StatusCode, Json<serde_json::Value>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "error": rejection.body_text() })),
            )
        }
    };
    let tx = match request.validate() {
        Ok(tx) => tx,
        Err(e) => return error_response(&e),
    };

    let worker = state.clone();
    let scored = tokio::task::spawn_blocking(move || worker.service.score(&tx)).await;

    match scored {
        Ok(Ok(response)) => {
            if let Some(notifier) = &state.notifier {
                notifier.notify(&response);
            }
            (StatusCode::OK, Json(serde_json::json!(response)))
        }
        Ok(Err(e)) => error_response(&e),
        Err(e) => {
            error!("Scoring task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "scoring task failed" })),
            )
        }
    }
}
