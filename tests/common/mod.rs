#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use jornada_api::auth;
use jornada_api::config::AppConfig;
use jornada_api::database::models::{User, UserRole};
use jornada_api::database::{MemoryStore, Store};
use jornada_api::storage::MemoryObjectStore;
use jornada_api::AppState;

pub const PASSWORD: &str = "secret123";
const BOUNDARY: &str = "jornada-test-boundary";

/// The real router over in-memory backends.
pub struct TestApp {
    pub state: AppState,
    pub objects: Arc<MemoryObjectStore>,
    router: Router,
}

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::for_tests())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let objects = Arc::new(MemoryObjectStore::new(config.storage.public_base_url.clone()));
        let state = AppState::new(Arc::new(MemoryStore::new()), objects.clone(), config);
        let router = jornada_api::app(state.clone());
        Self { state, objects, router }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Reply> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok(Reply { status, body })
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Reply> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<Reply> {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<Reply> {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<Reply> {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    /// Inserts a user directly, bypassing registration and approval.
    pub async fn seed_user(&self, role: UserRole) -> Result<User> {
        let email = format!("{}-{}@jornada.test", role, Uuid::new_v4().simple());
        let password_hash = auth::hash_password(PASSWORD, 4).await?;
        let user = self
            .state
            .store
            .insert_user(jornada_api::database::models::NewUser {
                name: format!("Test {}", role),
                email,
                password_hash,
                role,
                course_id: Some("ADS".into()),
                period_semester: Some("2024.1".into()),
            })
            .await?;
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let reply = self
            .call(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        anyhow::ensure!(reply.status == StatusCode::OK, "login failed: {}", reply.body);
        reply.data()["token"]
            .as_str()
            .map(str::to_string)
            .context("login response without token")
    }

    /// Seeds a user with `role` and logs in through the API.
    pub async fn user_with_token(&self, role: UserRole) -> Result<(User, String)> {
        let user = self.seed_user(role).await?;
        let token = self.login(&user.email, PASSWORD).await?;
        Ok((user, token))
    }

    /// A leader who already owns a group named `name`.
    pub async fn leader_with_group(&self, name: &str) -> Result<(User, String, Uuid)> {
        let (leader, token) = self.user_with_token(UserRole::Leader).await?;
        let reply = self.post("/groups", &token, json!({ "name": name })).await?;
        anyhow::ensure!(reply.status == StatusCode::CREATED, "group create failed: {}", reply.body);
        let group_id = Uuid::parse_str(reply.data()["id"].as_str().unwrap_or_default())?;
        Ok((leader, token, group_id))
    }

    pub async fn create_phase(&self, token: &str, name: &str, order: i32) -> Result<Uuid> {
        let reply = self
            .post("/schedule", token, json!({ "name": name, "orderNum": order }))
            .await?;
        anyhow::ensure!(reply.status == StatusCode::CREATED, "phase create failed: {}", reply.body);
        Ok(Uuid::parse_str(reply.data()["id"].as_str().unwrap_or_default())?)
    }

    /// Sends `multipart/form-data` with optional `phaseId` and `file` parts.
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        phase_id: Option<Uuid>,
        file: Option<(&str, &str)>,
    ) -> Result<Reply> {
        let mut body: Vec<u8> = Vec::new();
        if let Some(phase_id) = phase_id {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"phaseId\"\r\n\r\n{phase_id}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, contents)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(contents.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))?;
        self.send(request).await
    }
}
