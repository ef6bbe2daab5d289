// handlers/elevated/schedule.rs - POST /schedule, PUT /schedule/:id

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::Action;
use crate::database::models::Phase;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::phase_service::{self, CreatePhaseRequest, UpdatePhaseRequest};
use crate::state::AppState;

/// POST /schedule - create an inactive phase
pub async fn create_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    payload: Result<Json<CreatePhaseRequest>, JsonRejection>,
) -> ApiResult<Phase> {
    caller.require(Action::ManageSchedule)?;
    let Json(request) = payload?;
    let phase = phase_service::create(&state, &caller, request).await?;
    Ok(ApiResponse::created(phase))
}

/**
 * PUT /schedule/:id - Activate or deactivate a phase
 *
 * Expected Input:
 * ```json
 * { "isActive": true, "startDate": "2024-03-01", "endDate": "2024-03-31" }
 * ```
 *
 * Activation deactivates every other phase in the same transaction. The
 * updated phase is then broadcast to realtime clients as `phaseUpdated`.
 */
pub async fn update_put(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdatePhaseRequest>, JsonRejection>,
) -> ApiResult<Phase> {
    caller.require(Action::ManageSchedule)?;
    let Path(phase_id) = path?;
    let Json(request) = payload?;
    let phase = phase_service::set_state(&state, &caller, phase_id, request).await?;
    Ok(ApiResponse::success(phase))
}
