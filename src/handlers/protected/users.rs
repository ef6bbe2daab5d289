// handlers/protected/users.rs - /users coordinator endpoints

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Extension,
};
use uuid::Uuid;

use crate::auth::Action;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service;
use crate::state::AppState;

/// GET /users
pub async fn list_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Vec<User>> {
    caller.require(Action::ListUsers)?;
    Ok(ApiResponse::success(user_service::list_all(&state).await?))
}

/// GET /users/pending
pub async fn pending_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Vec<User>> {
    caller.require(Action::ListUsers)?;
    Ok(ApiResponse::success(user_service::list_pending(&state).await?))
}

/// PUT /users/approve/:id - pending -> student
pub async fn approve_put(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<User> {
    caller.require(Action::ReviewUsers)?;
    let Path(user_id) = path?;
    Ok(ApiResponse::success(user_service::approve(&state, &caller, user_id).await?))
}

/// PUT /users/reject/:id - any -> inactive
pub async fn reject_put(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<User> {
    caller.require(Action::ReviewUsers)?;
    let Path(user_id) = path?;
    Ok(ApiResponse::success(user_service::reject(&state, &caller, user_id).await?))
}
