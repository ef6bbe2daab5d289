use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::validation::{validate_name, FieldErrors};
use crate::database::models::{
    Group, GroupWithMembers, JoinRequest, JoinRequestDetails, NewGroup, RequestStatus,
};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RespondJoinRequest {
    pub status: Option<String>,
}

pub async fn list(state: &AppState) -> Result<Vec<GroupWithMembers>, ApiError> {
    let groups = state.store.list_groups().await?;

    let mut result = Vec::with_capacity(groups.len());
    for group in groups {
        let members = state.store.list_group_members(group.id).await?;
        result.push(GroupWithMembers { group, members });
    }
    Ok(result)
}

pub async fn get(state: &AppState, group_id: Uuid) -> Result<GroupWithMembers, ApiError> {
    let group = find(state, group_id).await?;
    let members = state.store.list_group_members(group.id).await?;
    Ok(GroupWithMembers { group, members })
}

/// Creates the caller's group and makes them its first member. Course and
/// period come from the leader's own record.
pub async fn create(
    state: &AppState,
    caller: &AuthUser,
    request: CreateGroupRequest,
) -> Result<Group, ApiError> {
    let mut errors = FieldErrors::new();
    let name = errors.check("name", validate_name(request.name.as_deref()));
    errors.finish()?;
    let name = name.ok_or_else(|| ApiError::field("name", "Name is required"))?;

    if caller.group_id.is_some() {
        return Err(ApiError::conflict("Leader already belongs to a group"));
    }

    let group = state
        .store
        .create_group(NewGroup {
            name,
            description: request
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            leader_id: caller.id,
            course_id: caller.user.course_id.clone(),
            period_semester: caller.user.period_semester.clone(),
        })
        .await?;

    info!("Group {} created by leader {}", group.id, caller.id);
    Ok(group)
}

pub async fn approve(state: &AppState, caller: &AuthUser, group_id: Uuid) -> Result<Group, ApiError> {
    let group = state
        .store
        .approve_group(group_id, caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    info!("Group {} approved by {}", group.id, caller.id);
    Ok(group)
}

pub async fn request_join(
    state: &AppState,
    caller: &AuthUser,
    group_id: Uuid,
) -> Result<JoinRequest, ApiError> {
    find(state, group_id).await?;

    if caller.group_id.is_some() {
        return Err(ApiError::conflict("You already belong to a group"));
    }

    let request = state.store.create_join_request(caller.id, group_id).await?;
    info!("Student {} requested to join group {}", caller.id, group_id);
    Ok(request)
}

/// Pending requests for a group the caller leads, newest first.
pub async fn list_join_requests(
    state: &AppState,
    caller: &AuthUser,
    group_id: Uuid,
) -> Result<Vec<JoinRequestDetails>, ApiError> {
    let group = find(state, group_id).await?;
    require_leader_of(&group, caller)?;

    Ok(state
        .store
        .list_join_requests(group_id, RequestStatus::Pending)
        .await?)
}

/// Approving assigns the student to the group in the same transaction.
/// Rejecting an already approved request leaves the membership in place.
pub async fn respond(
    state: &AppState,
    caller: &AuthUser,
    group_id: Uuid,
    request_id: Uuid,
    request: RespondJoinRequest,
) -> Result<JoinRequest, ApiError> {
    let status = match request.status.as_deref().map(str::parse::<RequestStatus>) {
        Some(Ok(status @ (RequestStatus::Approved | RequestStatus::Rejected))) => status,
        _ => return Err(ApiError::field("status", "Status must be 'approved' or 'rejected'")),
    };

    let group = find(state, group_id).await?;
    require_leader_of(&group, caller)?;

    let updated = state
        .store
        .respond_join_request(group_id, request_id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Join request not found"))?;

    info!(
        "Join request {} for group {} marked {} by {}",
        updated.id,
        group_id,
        status.as_str(),
        caller.id
    );
    Ok(updated)
}

pub async fn leave(state: &AppState, caller: &AuthUser, group_id: Uuid) -> Result<(), ApiError> {
    if caller.group_id != Some(group_id) {
        return Err(ApiError::forbidden("You are not a member of this group"));
    }

    let group = find(state, group_id).await?;
    if group.leader_id == caller.id {
        return Err(ApiError::conflict("The group leader cannot leave the group"));
    }

    if !state.store.leave_group(caller.id, group_id).await? {
        return Err(ApiError::forbidden("You are not a member of this group"));
    }

    info!("User {} left group {}", caller.id, group_id);
    Ok(())
}

async fn find(state: &AppState, group_id: Uuid) -> Result<Group, ApiError> {
    state
        .store
        .find_group(group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))
}

fn require_leader_of(group: &Group, caller: &AuthUser) -> Result<(), ApiError> {
    if group.leader_id == caller.id {
        Ok(())
    } else {
        Err(ApiError::forbidden("Only the group leader can manage join requests"))
    }
}
