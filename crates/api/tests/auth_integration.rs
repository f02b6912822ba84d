//! Integration tests for signup, login and bearer token handling.

mod common;

use axum::http::{header, Method, StatusCode};
use common::{
    assert_error_body, create_authenticated_user, create_test_app, request, send, TestUser,
};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_ping() {
    let app = create_test_app();
    let (status, body) = send(&app, request(Method::GET, "/api/ping", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "pong" }));
}

#[tokio::test]
async fn test_health_reports_memory_backend() {
    let app = create_test_app();
    let (status, body) = send(&app, request(Method::GET, "/api/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"]["backend"], "memory");
    assert_eq!(body["storage"]["connected"], true);
}

#[tokio::test]
async fn test_signup_success() {
    let app = create_test_app();
    let user = TestUser::new();

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/signup",
            None,
            Some(json!({
                "name": user.name,
                "email": user.email.to_uppercase(),
                "password": user.password
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["name"], user.name.as_str());
    assert_eq!(body["email"], user.email.to_lowercase());
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let app = create_test_app();
    let user = TestUser::new();
    let payload = json!({ "name": user.name, "email": user.email, "password": user.password });

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/signup", None, Some(payload.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, request(Method::POST, "/api/signup", None, Some(payload))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error_body(&body);
    assert_eq!(body["message"], "email already registered");
}

#[tokio::test]
async fn test_signup_validation() {
    let app = create_test_app();

    let invalid = [
        json!({ "name": "A", "email": "a@example.com", "password": "secret123" }),
        json!({ "name": "Alice", "email": "not-an-email", "password": "secret123" }),
        json!({ "name": "Alice", "email": "a@example.com", "password": "short" }),
        json!({ "name": "Alice", "email": "a@example.com" }),
    ];

    for payload in invalid {
        let (status, body) = send(
            &app,
            request(Method::POST, "/api/signup", None, Some(payload.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {}", payload);
        assert_error_body(&body);
    }
}

#[tokio::test]
async fn test_login_success() {
    let app = create_test_app();
    let user = create_authenticated_user(&app).await;

    assert!(!user.token.is_empty());
    assert!(user.id > 0);
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let app = create_test_app();
    let user = create_authenticated_user(&app).await;

    let (wrong_status, wrong_body) = send(
        &app,
        request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": user.email, "password": "definitely-wrong" })),
        ),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "secret123" })),
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_error_body(&wrong_body);
    assert_eq!(wrong_body["message"], unknown_body["message"]);
}

#[tokio::test]
async fn test_malformed_login_is_unauthorized() {
    let app = create_test_app();

    for payload in [
        json!({ "email": "not-an-email", "password": "secret123" }),
        json!({ "email": "", "password": "" }),
    ] {
        let (status, body) = send(
            &app,
            request(Method::POST, "/api/login", None, Some(payload.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "payload: {}", payload);
        assert_error_body(&body);
    }
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = create_test_app();

    let (status, body) = send(&app, request(Method::GET, "/api/events/organized", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_body(&body);

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/events/organized", Some("not.a.token"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_token_from_another_deployment_is_rejected() {
    let app = create_test_app();
    let foreign = shared::jwt::JwtConfig::new("some-other-secret", 3600, 30)
        .unwrap()
        .issue_token(1, "alice@example.com")
        .unwrap();

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/events/invited", Some(&foreign.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_returns_error_body() {
    let app = create_test_app();
    let req = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"name\": "))
        .unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body);
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = create_test_app();
    let (status, body) = send(&app, request(Method::GET, "/api/nope", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_body(&body);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app();
    let req = axum::http::Request::builder()
        .uri("/api/ping")
        .header("X-Request-ID", "req-42")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}
