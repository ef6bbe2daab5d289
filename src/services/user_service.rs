use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::{LeaderRequest, User, UserRole};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub async fn list_all(state: &AppState) -> Result<Vec<User>, ApiError> {
    Ok(state.store.list_users(None).await?)
}

pub async fn list_pending(state: &AppState) -> Result<Vec<User>, ApiError> {
    Ok(state.store.list_users(Some(UserRole::Pending)).await?)
}

/// pending -> student. Any other current role is a `Conflict`.
pub async fn approve(state: &AppState, caller: &AuthUser, user_id: Uuid) -> Result<User, ApiError> {
    let user = state
        .store
        .update_user_role(user_id, Some(UserRole::Pending), UserRole::Student, Some(caller.id))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!("User {} approved by {}", user.id, caller.id);
    Ok(user)
}

/// any -> inactive. Only a superadmin may deactivate another superadmin.
pub async fn reject(state: &AppState, caller: &AuthUser, user_id: Uuid) -> Result<User, ApiError> {
    if user_id == caller.id {
        return Err(ApiError::conflict("You cannot deactivate your own account"));
    }

    let target = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if target.role == UserRole::Superadmin && caller.role != UserRole::Superadmin {
        warn!("User {} tried to deactivate superadmin {}", caller.id, target.id);
        return Err(ApiError::forbidden("Only a superadmin can deactivate a superadmin"));
    }

    let user = state
        .store
        .update_user_role(user_id, None, UserRole::Inactive, None)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!("User {} rejected by {}", user.id, caller.id);
    Ok(user)
}

/// Opens a leader request for the caller. The role stays `student` until a
/// coordinator approves it.
pub async fn request_leader(state: &AppState, caller: &AuthUser) -> Result<LeaderRequest, ApiError> {
    let request = state.store.create_leader_request(caller.id).await?;
    info!("User {} requested leader promotion", caller.id);
    Ok(request)
}
