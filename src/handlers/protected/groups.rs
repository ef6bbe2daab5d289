// handlers/protected/groups.rs - /groups and join requests

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Action;
use crate::database::models::{Group, GroupWithMembers, JoinRequest, JoinRequestDetails};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::group_service::{self, CreateGroupRequest, RespondJoinRequest};
use crate::state::AppState;

/// GET /groups - every group with its members
pub async fn list_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Vec<GroupWithMembers>> {
    caller.require(Action::ViewGroups)?;
    Ok(ApiResponse::success(group_service::list(&state).await?))
}

/// GET /groups/:id
pub async fn show_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<GroupWithMembers> {
    caller.require(Action::ViewGroups)?;
    let Path(group_id) = path?;
    Ok(ApiResponse::success(group_service::get(&state, group_id).await?))
}

/**
 * POST /groups - Leader creates their group
 *
 * Expected Input:
 * ```json
 * { "name": "Equipe Alfa", "description": "optional" }
 * ```
 *
 * 409 when the leader already owns or belongs to a group.
 */
pub async fn create_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> ApiResult<Group> {
    caller.require(Action::CreateGroup)?;
    let Json(request) = payload?;
    let group = group_service::create(&state, &caller, request).await?;
    Ok(ApiResponse::created(group))
}

/// PUT /groups/:id/approve
pub async fn approve_put(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Group> {
    caller.require(Action::ApproveGroup)?;
    let Path(group_id) = path?;
    Ok(ApiResponse::success(group_service::approve(&state, &caller, group_id).await?))
}

/// POST /groups/:id/join
pub async fn join_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<JoinRequest> {
    caller.require(Action::RequestJoin)?;
    let Path(group_id) = path?;
    let request = group_service::request_join(&state, &caller, group_id).await?;
    Ok(ApiResponse::created(request))
}

/// GET /groups/:id/join-requests - pending, newest first
pub async fn join_requests_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<JoinRequestDetails>> {
    caller.require(Action::ManageJoinRequests)?;
    let Path(group_id) = path?;
    let requests = group_service::list_join_requests(&state, &caller, group_id).await?;
    Ok(ApiResponse::success(requests))
}

/**
 * PUT /groups/:gid/join-requests/:rid - Leader answers a join request
 *
 * Expected Input:
 * ```json
 * { "status": "approved" }   // or "rejected"
 * ```
 */
pub async fn join_request_put(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<RespondJoinRequest>, JsonRejection>,
) -> ApiResult<JoinRequest> {
    caller.require(Action::ManageJoinRequests)?;
    let Path((group_id, request_id)) = path?;
    let Json(request) = payload?;
    let updated = group_service::respond(&state, &caller, group_id, request_id, request).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /groups/:id/leave
pub async fn leave_delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Value> {
    caller.require(Action::LeaveGroup)?;
    let Path(group_id) = path?;
    group_service::leave(&state, &caller, group_id).await?;
    Ok(ApiResponse::success(json!({ "groupId": group_id, "left": true })))
}
