// handlers/elevated/coordinators.rs - POST /auth/register/coordinator

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::info;

use crate::auth::Action;
use crate::database::models::{User, UserRole};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::auth_service::{self, RegisterRequest};
use crate::state::AppState;

/// Same body as `/auth/register`; the account is created as `coordinator`.
pub async fn register_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<User> {
    caller.require(Action::RegisterCoordinator)?;
    let Json(request) = payload?;

    let user = auth_service::register(&state, request, UserRole::Coordinator).await?;
    info!("Coordinator {} registered by {}", user.id, caller.id);
    Ok(ApiResponse::created(user))
}
