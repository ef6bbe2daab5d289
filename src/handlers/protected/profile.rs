// handlers/protected/profile.rs - GET /auth/user

use axum::Extension;

use crate::auth::Action;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Returns the caller's own record as currently stored.
pub async fn user_get(Extension(caller): Extension<AuthUser>) -> ApiResult<User> {
    caller.require(Action::ViewProfile)?;
    Ok(ApiResponse::success(caller.user))
}
