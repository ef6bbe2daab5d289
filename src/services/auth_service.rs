use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::validation::{validate_email_format, validate_name, validate_password, FieldErrors};
use crate::auth::{self, Claims};
use crate::database::models::{NewUser, User, UserRole};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub course_id: Option<String>,
    pub period_semester: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub async fn login(state: &AppState, request: LoginRequest) -> Result<LoginResponse, ApiError> {
    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::validation_error("Email and password are required", None));
    }

    let Some(user) = state.store.find_user_by_email(email).await? else {
        warn!("Failed login for unknown email");
        return Err(ApiError::invalid_credentials());
    };

    if !auth::verify_password(password, &user.password_hash).await? {
        warn!("Failed login for user {}", user.id);
        return Err(ApiError::invalid_credentials());
    }

    let security = &state.config.security;
    let claims = Claims::new(user.id, user.role, security.jwt_expiry_hours);
    let token = auth::generate_jwt(&claims, security)?;

    info!("User {} logged in as {}", user.id, user.role);
    Ok(LoginResponse { token, user })
}

/// Creates an account with `role`: `pending` for self-registration,
/// `coordinator` when a superadmin registers one.
pub async fn register(
    state: &AppState,
    request: RegisterRequest,
    role: UserRole,
) -> Result<User, ApiError> {
    let mut errors = FieldErrors::new();
    let name = errors.check("name", validate_name(request.name.as_deref()));
    let email = errors.check("email", validate_email_format(request.email.as_deref()));
    let password = errors.check("password", validate_password(request.password.as_deref()));
    errors.finish()?;

    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(ApiError::validation_error("Validation failed", None));
    };

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::duplicate_email());
    }

    let password_hash = auth::hash_password(&password, state.config.security.bcrypt_cost).await?;

    let user = state
        .store
        .insert_user(NewUser {
            name,
            email,
            password_hash,
            role,
            course_id: trimmed(request.course_id),
            period_semester: trimmed(request.period_semester),
        })
        .await
        .map_err(|err| match err {
            DatabaseError::Conflict(_) => ApiError::duplicate_email(),
            other => other.into(),
        })?;

    info!("Registered user {} as {}", user.id, user.role);
    Ok(user)
}

/// Nothing is sent; the call only confirms the address is known.
pub async fn forgot_password(state: &AppState, request: ForgotPasswordRequest) -> Result<(), ApiError> {
    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    if email.is_empty() {
        return Err(ApiError::field("email", "Email is required"));
    }

    match state.store.find_user_by_email(email).await? {
        Some(user) => {
            info!("Password reset requested for user {}", user.id);
            Ok(())
        }
        None => Err(ApiError::not_found("No account with that email")),
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
