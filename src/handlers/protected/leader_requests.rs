// handlers/protected/leader_requests.rs - /leader-requests

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Extension,
};
use uuid::Uuid;

use crate::auth::Action;
use crate::database::models::{LeaderRequest, LeaderRequestDetails};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{leader_request_service, user_service};
use crate::state::AppState;

/// POST /leader-requests - a student asks to become a leader
pub async fn create_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<LeaderRequest> {
    caller.require(Action::RequestLeader)?;
    let request = user_service::request_leader(&state, &caller).await?;
    Ok(ApiResponse::created(request))
}

/// GET /leader-requests - pending requests, oldest first
pub async fn list_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Vec<LeaderRequestDetails>> {
    caller.require(Action::ReviewLeaderRequests)?;
    Ok(ApiResponse::success(leader_request_service::list_pending(&state).await?))
}

/// PUT /leader-requests/:id/approve
pub async fn approve_put(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<LeaderRequest> {
    caller.require(Action::ReviewLeaderRequests)?;
    let Path(request_id) = path?;
    let request = leader_request_service::approve(&state, &caller, request_id).await?;
    Ok(ApiResponse::success(request))
}

/// PUT /leader-requests/:id/reject
pub async fn reject_put(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<LeaderRequest> {
    caller.require(Action::ReviewLeaderRequests)?;
    let Path(request_id) = path?;
    let request = leader_request_service::reject(&state, &caller, request_id).await?;
    Ok(ApiResponse::success(request))
}
