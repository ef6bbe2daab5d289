// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, which injects the
// caller as `Extension<AuthUser>`. Each handler names its `Action` and calls
// `AuthUser::require` before touching data.
//
// Security Level: JWT Authentication Required
// Middleware: jwt_auth_middleware

pub mod documents;
pub mod groups;
pub mod leader_requests;
pub mod profile;
pub mod results;
pub mod schedule;
pub mod submissions;
pub mod upload;
pub mod users;
