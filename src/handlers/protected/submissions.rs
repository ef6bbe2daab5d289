// handlers/protected/submissions.rs - /submissions

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
        Multipart, Path, State,
    },
    Extension, Json,
};
use uuid::Uuid;

use super::upload::read_upload_form;
use crate::auth::Action;
use crate::database::models::Submission;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::submission_service::{self, GradeRequest};
use crate::state::AppState;

/// GET /submissions - all for staff, the caller's group otherwise
pub async fn list_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Vec<Submission>> {
    caller.require(Action::ViewSubmissions)?;
    Ok(ApiResponse::success(submission_service::list(&state, &caller).await?))
}

/**
 * POST /submissions - Leader uploads a deliverable for a phase
 *
 * multipart/form-data with parts:
 *   file     the deliverable
 *   phaseId  UUID of the phase
 */
pub async fn create_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Submission> {
    caller.require(Action::Submit)?;
    let form = read_upload_form(multipart?).await?;
    let submission = submission_service::submit(&state, &caller, form).await?;
    Ok(ApiResponse::created(submission))
}

/**
 * PUT /submissions/:id/grade
 *
 * Expected Input:
 * ```json
 * { "grade": 87.5, "feedback": "Solid delivery" }
 * ```
 */
pub async fn grade_put(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<GradeRequest>, JsonRejection>,
) -> ApiResult<Submission> {
    caller.require(Action::Grade)?;
    let Path(submission_id) = path?;
    let Json(request) = payload?;
    let submission = submission_service::grade(&state, &caller, submission_id, request).await?;
    Ok(ApiResponse::success(submission))
}
