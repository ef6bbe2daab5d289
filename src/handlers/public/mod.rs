// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, self-registration and service status.
//
// Security Level: None
// Middleware: None

pub mod auth;
pub mod health;

pub use auth::*;
pub use health::{health_get, root_get};
