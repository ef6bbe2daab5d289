// handlers/protected/schedule.rs - GET /schedule

use axum::{extract::State, Extension};

use crate::auth::Action;
use crate::database::models::Phase;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::phase_service;
use crate::state::AppState;

/// Every phase ordered by `orderNum`.
pub async fn list_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Vec<Phase>> {
    caller.require(Action::ViewSchedule)?;
    Ok(ApiResponse::success(phase_service::list(&state).await?))
}
