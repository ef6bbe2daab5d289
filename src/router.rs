use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::realtime::socket;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security.cors_origins);

    let router = Router::new()
        // Public
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        .merge(auth_public_routes())
        // Realtime authenticates from the query string
        .route("/ws", get(socket::ws_get))
        // Protected + elevated share one auth layer
        .merge(protected_routes(state.clone()))
        .fallback(not_found)
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors);

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/login", post(auth::login_post))
        .route("/auth/register", post(auth::register_post))
        .route("/auth/forgot-password", post(auth::forgot_password_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{documents, groups, leader_requests, profile, results, schedule, submissions, users};

    Router::new()
        .route("/auth/user", get(profile::user_get))
        .route("/auth/register/coordinator", post(elevated::coordinators::register_post))
        // Users
        .route("/users", get(users::list_get))
        .route("/users/pending", get(users::pending_get))
        .route("/users/approve/:id", put(users::approve_put))
        .route("/users/reject/:id", put(users::reject_put))
        // Leader requests
        .route(
            "/leader-requests",
            get(leader_requests::list_get).post(leader_requests::create_post),
        )
        .route("/leader-requests/:id/approve", put(leader_requests::approve_put))
        .route("/leader-requests/:id/reject", put(leader_requests::reject_put))
        // Groups
        .route("/groups", get(groups::list_get).post(groups::create_post))
        .route("/groups/:id", get(groups::show_get))
        .route("/groups/:id/approve", put(groups::approve_put))
        .route("/groups/:id/join", post(groups::join_post))
        .route("/groups/:id/join-requests", get(groups::join_requests_get))
        .route("/groups/:id/join-requests/:request_id", put(groups::join_request_put))
        .route("/groups/:id/leave", delete(groups::leave_delete))
        // Schedule
        .route(
            "/schedule",
            get(schedule::list_get).post(elevated::schedule::create_post),
        )
        .route("/schedule/:id", put(elevated::schedule::update_put))
        // Submissions, results, documents
        .route("/submissions", get(submissions::list_get).post(submissions::create_post))
        .route("/submissions/:id/grade", put(submissions::grade_put))
        .route("/results", get(results::list_get))
        .route("/documents", get(documents::list_get).post(documents::create_post))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
