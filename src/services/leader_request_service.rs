use tracing::info;
use uuid::Uuid;

use crate::database::models::{LeaderRequest, LeaderRequestDetails, RequestStatus};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Pending requests with the requester's name and email, oldest first.
pub async fn list_pending(state: &AppState) -> Result<Vec<LeaderRequestDetails>, ApiError> {
    Ok(state.store.list_leader_requests(RequestStatus::Pending).await?)
}

pub async fn approve(
    state: &AppState,
    caller: &AuthUser,
    request_id: Uuid,
) -> Result<LeaderRequest, ApiError> {
    resolve(state, caller, request_id, RequestStatus::Approved).await
}

pub async fn reject(
    state: &AppState,
    caller: &AuthUser,
    request_id: Uuid,
) -> Result<LeaderRequest, ApiError> {
    resolve(state, caller, request_id, RequestStatus::Rejected).await
}

async fn resolve(
    state: &AppState,
    caller: &AuthUser,
    request_id: Uuid,
    status: RequestStatus,
) -> Result<LeaderRequest, ApiError> {
    let request = state
        .store
        .resolve_leader_request(request_id, status, caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Leader request not found"))?;

    info!(
        "Leader request {} for user {} marked {} by {}",
        request.id,
        request.user_id,
        status.as_str(),
        caller.id
    );
    Ok(request)
}
