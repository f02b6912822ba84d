//! Shared helpers for API integration tests.
//!
//! Every test builds its own router on a fresh in-memory store, so tests
//! are independent and need no database.

#![allow(dead_code)] // Each test binary uses a different subset

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use event_planner_api::app::create_app;
use event_planner_api::config::{
    Config, DatabaseConfig, JwtAuthConfig, LogFormat, LoggingConfig, SecurityConfig,
    ServerConfig, StorageBackend, StorageConfig,
};
use fake::faker::name::en::Name;
use fake::Fake;
use persistence::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "secret123";

/// Configuration for the in-memory backend.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 60,
            run_migrations: false,
        },
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        },
        security: SecurityConfig {
            cors_origins: vec![],
            hsts_enabled: false,
        },
        jwt: JwtAuthConfig {
            secret: "integration-test-secret".to_string(),
            token_expiry_secs: 3600,
            leeway_secs: 30,
        },
    }
}

/// Router over a fresh in-memory store.
pub fn create_test_app() -> Router {
    create_app(test_config(), Arc::new(MemoryStore::new())).expect("Failed to build app")
}

pub fn unique_test_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Builds a request with an optional bearer token and JSON body.
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends a request and returns the status with the parsed JSON body
/// (`Value::Null` when the body is not JSON).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Test user data.
pub struct TestUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl TestUser {
    pub fn new() -> Self {
        Self {
            name: Name().fake(),
            email: unique_test_email(),
            password: TEST_PASSWORD.to_string(),
        }
    }
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered user holding a valid token.
pub struct AuthenticatedUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub token: String,
}

/// Signs a new user up and logs them in.
pub async fn create_authenticated_user(app: &Router) -> AuthenticatedUser {
    let user = TestUser::new();

    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/signup",
            None,
            Some(json!({ "name": user.name, "email": user.email, "password": user.password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);

    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": user.email, "password": user.password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    AuthenticatedUser {
        id: body["user"]["id"].as_i64().expect("user.id"),
        name: user.name,
        email: user.email,
        token: body["token"].as_str().expect("token").to_string(),
    }
}

pub fn event_payload(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Celebrating the release",
        "location": "Rooftop",
        "eventDate": "2025-06-01",
        "eventTime": "18:30"
    })
}

/// Creates an event and returns its id.
pub async fn create_event(app: &Router, owner: &AuthenticatedUser, title: &str) -> i64 {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/events",
            Some(&owner.token),
            Some(event_payload(title)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create event failed: {}", body);
    body["id"].as_i64().expect("event id")
}

/// Invites `invitee` to an event, optionally with an explicit role.
pub async fn invite(
    app: &Router,
    organizer: &AuthenticatedUser,
    event_id: i64,
    invitee: &AuthenticatedUser,
    role: Option<&str>,
) -> (StatusCode, Value) {
    let mut payload = json!({ "email": invitee.email });
    if let Some(role) = role {
        payload["role"] = json!(role);
    }
    send(
        app,
        request(
            Method::POST,
            &format!("/api/events/{}/invite", event_id),
            Some(&organizer.token),
            Some(payload),
        ),
    )
    .await
}

pub async fn set_attendance(
    app: &Router,
    user: &AuthenticatedUser,
    event_id: i64,
    status: &str,
) -> (StatusCode, Value) {
    send(
        app,
        request(
            Method::PUT,
            &format!("/api/events/{}/attendance", event_id),
            Some(&user.token),
            Some(json!({ "status": status })),
        ),
    )
    .await
}

pub fn assert_error_body(body: &Value) {
    assert_eq!(body["error"], true, "not an error body: {}", body);
    assert!(body["message"].is_string(), "missing message: {}", body);
}
