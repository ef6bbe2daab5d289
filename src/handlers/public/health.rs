// handlers/public/health.rs - GET / and GET /health

use axum::extract::State;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn root_get() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "Jornada Fluxo Digital API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "public": ["/", "/health", "/auth/login", "/auth/register", "/auth/forgot-password"],
            "protected": [
                "/auth/user", "/users", "/groups", "/schedule", "/submissions",
                "/results", "/documents", "/leader-requests", "/ws"
            ]
        }
    })))
}

pub async fn health_get(State(state): State<AppState>) -> ApiResult<Value> {
    if let Err(err) = state.store.health_check().await {
        tracing::error!("Health check failed: {}", err);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "store": state.config.store_backend,
        "realtimeClients": state.realtime.connected().await,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
