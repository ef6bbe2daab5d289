// handlers/protected/results.rs - GET /results

use axum::{extract::State, Extension};

use crate::auth::Action;
use crate::database::models::GroupRanking;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::submission_service;
use crate::state::AppState;

pub async fn list_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Vec<GroupRanking>> {
    caller.require(Action::ViewResults)?;
    Ok(ApiResponse::success(submission_service::results(&state).await?))
}
