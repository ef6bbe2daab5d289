// handlers/public/auth/forgot_password.rs - POST /auth/forgot-password handler

use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth_service::{self, ForgotPasswordRequest};
use crate::state::AppState;

pub async fn forgot_password_post(
    State(state): State<AppState>,
    payload: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(request) = payload?;
    auth_service::forgot_password(&state, request).await?;
    Ok(ApiResponse::success(json!({
        "message": "If the account exists, reset instructions have been sent"
    })))
}
