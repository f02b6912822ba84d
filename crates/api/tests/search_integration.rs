//! Integration tests for keyword search.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    assert_error_body, create_authenticated_user, create_event, create_test_app, invite,
    request, send, AuthenticatedUser,
};
use serde_json::{json, Value};

async fn search(app: &axum::Router, user: &AuthenticatedUser, query: &str) -> (StatusCode, Value) {
    send(
        app,
        request(Method::GET, &format!("/api/search{}", query), Some(&user.token), None),
    )
    .await
}

fn titles(results: &Value) -> Vec<String> {
    results["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_search_only_returns_own_events() {
    let app = create_test_app();
    let alice = create_authenticated_user(&app).await;
    let mallory = create_authenticated_user(&app).await;
    create_event(&app, &alice, "Secret Summit").await;
    create_event(&app, &mallory, "Open Summit").await;

    let (status, results) = search(&app, &alice, "?keyword=summit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&results), vec!["Secret Summit".to_string()]);
    assert_eq!(results["events"][0]["myRole"], "organizer");
    assert_eq!(results["events"][0]["myStatus"], "going");

    let (_, results) = search(&app, &mallory, "?keyword=secret").await;
    assert!(titles(&results).is_empty());
}

#[tokio::test]
async fn test_search_keyword_is_literal() {
    let app = create_test_app();
    let alice = create_authenticated_user(&app).await;
    create_event(&app, &alice, "100% Fun Run").await;
    create_event(&app, &alice, "Board Meeting").await;

    let (_, results) = search(&app, &alice, "?keyword=%25").await;
    assert_eq!(titles(&results), vec!["100% Fun Run".to_string()]);

    let (_, results) = search(&app, &alice, "?keyword=_").await;
    assert!(titles(&results).is_empty());
}

#[tokio::test]
async fn test_search_role_filter() {
    let app = create_test_app();
    let alice = create_authenticated_user(&app).await;
    let bob = create_authenticated_user(&app).await;
    let alices = create_event(&app, &alice, "Alice Picnic").await;
    create_event(&app, &bob, "Bob Picnic").await;
    invite(&app, &alice, alices, &bob, None).await;

    let (_, results) = search(&app, &bob, "?keyword=picnic&role=attendee").await;
    assert_eq!(titles(&results), vec!["Alice Picnic".to_string()]);

    let (_, results) = search(&app, &bob, "?keyword=picnic&role=organizer").await;
    assert_eq!(titles(&results), vec!["Bob Picnic".to_string()]);

    // Unknown roles do not filter.
    let (status, results) = search(&app, &bob, "?keyword=picnic&role=host").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&results).len(), 2);
}

#[tokio::test]
async fn test_search_type_selects_collections() {
    let app = create_test_app();
    let alice = create_authenticated_user(&app).await;
    let event_id = create_event(&app, &alice, "Garden Party").await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/events/{}/tasks", event_id),
            Some(&alice.token),
            Some(json!({ "description": "Buy garden lights" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, all) = search(&app, &alice, "?keyword=garden").await;
    assert_eq!(all["events"].as_array().unwrap().len(), 1);
    assert_eq!(all["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(all["tasks"][0]["eventTitle"], "Garden Party");

    let (_, events_only) = search(&app, &alice, "?keyword=garden&type=events").await;
    assert!(events_only.get("tasks").is_none());
    assert_eq!(events_only["events"].as_array().unwrap().len(), 1);

    let (_, tasks_only) = search(&app, &alice, "?keyword=lights&type=tasks").await;
    assert!(tasks_only.get("events").is_none());
    assert_eq!(tasks_only["tasks"].as_array().unwrap().len(), 1);

    let (status, body) = search(&app, &alice, "?type=people").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body);
}

#[tokio::test]
async fn test_search_without_keyword_lists_everything_visible() {
    let app = create_test_app();
    let alice = create_authenticated_user(&app).await;
    create_event(&app, &alice, "One").await;
    create_event(&app, &alice, "Two").await;

    let (status, results) = search(&app, &alice, "?keyword=%20%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&results).len(), 2);
    assert!(results["tasks"].as_array().unwrap().is_empty());
}
