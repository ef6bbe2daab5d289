use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::{self, Action};
use crate::database::models::{User, UserRole};
use crate::error::ApiError;
use crate::state::AppState;

/// Header accepted alongside `Authorization: Bearer`.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Caller resolved from the token and the stored user row.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
    pub group_id: Option<Uuid>,
    pub user: User,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            group_id: user.group_id,
            user,
        }
    }
}

impl AuthUser {
    /// Fails with `Forbidden` unless the caller's role permits `action`.
    pub fn require(&self, action: Action) -> Result<(), ApiError> {
        if auth::allowed(action, self.role) {
            Ok(())
        } else {
            warn!(
                "Forbidden: user {} ({}) attempted {}",
                self.id,
                self.role,
                action.as_str()
            );
            Err(ApiError::forbidden("You do not have permission to perform this action"))
        }
    }
}

/// JWT authentication middleware that validates tokens and loads the caller
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;
    let auth_user = authenticate(&state, &token).await?;

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Verifies the token and loads its user. The stored role is authoritative,
/// so approvals and rejections apply to tokens issued before them.
pub async fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let claims = auth::verify_jwt(token, &state.config.security)?;

    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    if user.role == UserRole::Inactive {
        warn!("Rejected token for inactive user {}", user.id);
        return Err(ApiError::forbidden("Account is inactive"));
    }

    Ok(AuthUser::from(user))
}

/// Extract JWT token from `Authorization: Bearer` or `x-auth-token`
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    if let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            Some(_) => Err("Empty JWT token".to_string()),
            None => Err("Authorization header must use Bearer token format".to_string()),
        };
    }

    let token = headers
        .get(AUTH_TOKEN_HEADER)
        .ok_or_else(|| "Missing authentication token".to_string())?
        .to_str()
        .map_err(|_| "Invalid x-auth-token header format".to_string())?
        .trim();

    if token.is_empty() {
        return Err("Empty JWT token".to_string());
    }
    Ok(token.to_string())
}
