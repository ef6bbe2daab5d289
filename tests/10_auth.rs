mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::json;

use common::{TestApp, PASSWORD};
use jornada_api::database::models::UserRole;

fn registration(email: &str) -> serde_json::Value {
    json!({
        "name": "Ana Souza",
        "email": email,
        "password": "secret123",
        "courseId": "ADS",
        "periodSemester": "2024.1"
    })
}

#[tokio::test]
async fn root_and_health_are_public() -> Result<()> {
    let app = TestApp::new();

    let root = app.call(Method::GET, "/", None, None).await?;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.body["success"], true);

    let health = app.call(Method::GET, "/health", None, None).await?;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.data()["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn registration_creates_a_pending_account() -> Result<()> {
    let app = TestApp::new();

    let reply = app
        .call(Method::POST, "/auth/register", None, Some(registration("ana@jornada.test")))
        .await?;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.data()["role"], "pending");
    assert_eq!(reply.data()["courseId"], "ADS");
    assert!(reply.data().get("passwordHash").is_none());

    let duplicate = app
        .call(Method::POST, "/auth/register", None, Some(registration("ANA@jornada.test")))
        .await?;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.code(), "DUPLICATE_EMAIL");
    Ok(())
}

#[tokio::test]
async fn registration_reports_every_invalid_field() -> Result<()> {
    let app = TestApp::new();

    let reply = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "name": "", "email": "not-an-email", "password": "123" })),
        )
        .await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.code(), "VALIDATION_ERROR");
    let fields = &reply.body["fieldErrors"];
    assert!(fields.get("name").is_some());
    assert!(fields.get("email").is_some());
    assert!(fields.get("password").is_some());
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() -> Result<()> {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let reply = app.send(request).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.code(), "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn login_returns_token_and_user() -> Result<()> {
    let app = TestApp::new();
    let student = app.seed_user(UserRole::Student).await?;

    let reply = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": student.email, "password": PASSWORD })),
        )
        .await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.data()["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(reply.data()["user"]["id"], student.id.to_string());
    assert!(reply.data()["user"].get("passwordHash").is_none());
    Ok(())
}

#[tokio::test]
async fn login_failures_share_one_answer() -> Result<()> {
    let app = TestApp::new();
    let student = app.seed_user(UserRole::Student).await?;

    let wrong_password = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": student.email, "password": "nope-nope" })),
        )
        .await?;
    let unknown_email = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "ghost@jornada.test", "password": PASSWORD })),
        )
        .await?;

    for reply in [&wrong_password, &unknown_email] {
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.code(), "INVALID_CREDENTIALS");
    }
    assert_eq!(wrong_password.body["message"], unknown_email.body["message"]);
    Ok(())
}

#[tokio::test]
async fn profile_requires_a_valid_token() -> Result<()> {
    let app = TestApp::new();
    let (user, token) = app.user_with_token(UserRole::Student).await?;

    let missing = app.call(Method::GET, "/auth/user", None, None).await?;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let forged = app.get("/auth/user", "not.a.token").await?;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
    assert_eq!(forged.code(), "INVALID_TOKEN");

    let bearer = app.get("/auth/user", &token).await?;
    assert_eq!(bearer.status, StatusCode::OK);
    assert_eq!(bearer.data()["email"], user.email);

    let request = Request::builder()
        .uri("/auth/user")
        .header("x-auth-token", token.as_str())
        .body(Body::empty())?;
    let header = app.send(request).await?;
    assert_eq!(header.status, StatusCode::OK);
    assert_eq!(header.data()["id"], user.id.to_string());
    Ok(())
}

#[tokio::test]
async fn pending_account_only_sees_its_profile() -> Result<()> {
    let app = TestApp::new();
    let (_, token) = app.user_with_token(UserRole::Pending).await?;

    assert_eq!(app.get("/auth/user", &token).await?.status, StatusCode::OK);
    assert_eq!(app.get("/schedule", &token).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/groups", &token).await?.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn forgot_password_only_confirms_known_addresses() -> Result<()> {
    let app = TestApp::new();
    let student = app.seed_user(UserRole::Student).await?;

    let known = app
        .call(
            Method::POST,
            "/auth/forgot-password",
            None,
            Some(json!({ "email": student.email })),
        )
        .await?;
    assert_eq!(known.status, StatusCode::OK);

    let unknown = app
        .call(
            Method::POST,
            "/auth/forgot-password",
            None,
            Some(json!({ "email": "ghost@jornada.test" })),
        )
        .await?;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let empty = app
        .call(Method::POST, "/auth/forgot-password", None, Some(json!({})))
        .await?;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn only_superadmins_register_coordinators() -> Result<()> {
    let app = TestApp::new();
    let (_, root) = app.user_with_token(UserRole::Superadmin).await?;
    let (_, coordinator) = app.user_with_token(UserRole::Coordinator).await?;

    let denied = app
        .post("/auth/register/coordinator", &coordinator, registration("c2@jornada.test"))
        .await?;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let created = app
        .post("/auth/register/coordinator", &root, registration("c2@jornada.test"))
        .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["role"], "coordinator");

    let token = app.login("c2@jornada.test", "secret123").await?;
    assert_eq!(app.get("/users", &token).await?.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unknown_routes_answer_with_the_error_envelope() -> Result<()> {
    let app = TestApp::new();

    let reply = app.call(Method::GET, "/nope", None, None).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["success"], false);
    assert_eq!(reply.code(), "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn malformed_ids_and_forms_are_validation_errors() -> Result<()> {
    let app = TestApp::new();
    let (_, coordinator) = app.user_with_token(UserRole::Coordinator).await?;
    let (_, leader) = app.user_with_token(UserRole::Leader).await?;

    let reply = app.put("/users/approve/not-a-uuid", &coordinator, json!({})).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.code(), "VALIDATION_ERROR");

    let reply = app
        .put(
            "/groups/not-a-uuid/join-requests/also-bad",
            &leader,
            json!({ "status": "approved" }),
        )
        .await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.code(), "VALIDATION_ERROR");

    // a JSON body where multipart/form-data is expected
    let reply = app
        .post("/submissions", &leader, json!({ "phaseId": "x" }))
        .await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.code(), "VALIDATION_ERROR");
    Ok(())
}
