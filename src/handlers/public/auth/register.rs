// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::{rejection::JsonRejection, State}, Json};

use crate::database::models::{User, UserRole};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth_service::{self, RegisterRequest};
use crate::state::AppState;

/// POST /auth/register - Self-registration. The account stays `pending`
/// until a coordinator approves it.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(request) = payload?;
    let user = auth_service::register(&state, request, UserRole::Pending).await?;
    Ok(ApiResponse::created(user))
}
