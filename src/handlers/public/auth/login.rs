// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::{rejection::JsonRejection, State}, Json};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth_service::{self, LoginRequest, LoginResponse};
use crate::state::AppState;

/**
 * POST /auth/login - Authenticate and receive a session token
 *
 * Expected Input:
 * ```json
 * { "email": "ana@example.com", "password": "secret1" }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "success": true,
 *   "data": {
 *     "token": "eyJhbGciOiJIUzI1NiI...",
 *     "user": { "id": "...", "name": "Ana", "role": "student", ... }
 *   }
 * }
 * ```
 *
 * Unknown email and wrong password both answer 401 INVALID_CREDENTIALS.
 */
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let response = auth_service::login(&state, request).await?;
    Ok(ApiResponse::success(response))
}
