use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use std::convert::Infallible;
use tracing::error;

use crate::AppState;
use crate::handlers::utils::deliver_serialized_json;

/// Service banner for GET /
pub async fn handle_index(
    _req: Request<hyper::body::Incoming>,
    _state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    deliver_serialized_json(
        &json!({
            "service": "review-server",
            "status": "ok",
        }),
        StatusCode::OK,
    )
}

/// Liveness probe for GET /health; pings the database
pub async fn handle_health(
    _req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => deliver_serialized_json(&json!({ "status": "ok" }), StatusCode::OK),
        Err(e) => {
            error!("Health check failed: {}", e);
            deliver_serialized_json(
                &json!({ "status": "degraded" }),
                StatusCode::SERVICE_UNAVAILABLE,
            )
        }
    }
}
