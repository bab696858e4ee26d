//! End-to-end tests of the client shell over HTTP.
//!
//! These tests build a `ClientShell` with the HTTP backend pointed at a
//! mock server and drive it the way the screens do.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use murmur::{
    ApiError, ApiErrorKind, ClientError, ClientSettings, ClientShell, LoadOutcome,
    RegistrationForm, ValidationError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn shell_for(server: &MockServer) -> ClientShell {
    ClientShell::from_settings(ClientSettings {
        api_url: Some(server.uri()),
        timeout_ms: 2_000,
        ..ClientSettings::default()
    })
    .expect("build shell")
}

fn seed_body() -> serde_json::Value {
    json!([
        {"id": "1", "text": "Welcome!", "author": "You", "createdAt": "2024-05-01T12:00:00Z"},
        {"id": "2", "text": "Say hi", "author": "Community", "createdAt": "2024-05-01T11:00:00Z"},
    ])
}

#[tokio::test]
async fn test_login_sends_one_request_with_dual_identifier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({
            "username": "ada@example.com",
            "email": "ada@example.com",
            "password": "secret1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "opaque"})))
        .expect(1)
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    let session = shell.login("ada@example.com", "secret1").await.unwrap();

    assert_eq!(session.identifier, "ada@example.com");
    assert_eq!(session.payload, Some(json!({"token": "opaque"})));
    assert_eq!(shell.session().await, Some(session));
}

#[tokio::test]
async fn test_login_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    let err = shell.login("ada", "wrong").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(err.as_api().map(|e| e.status_code), Some(401));
    assert_eq!(shell.session().await, None);
}

#[tokio::test]
async fn test_register_validation_failure_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    let form = RegistrationForm::new("Ada", "ada@example.com", "abc", "xyz");
    let err = shell.register(&form).await.unwrap_err();

    assert_eq!(err, ClientError::Validation(ValidationError::PasswordMismatch));
}

#[tokio::test]
async fn test_register_maps_name_to_username() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_json(json!({
            "username": "Ada",
            "email": "ada@example.com",
            "password": "secret1",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    let form = RegistrationForm::new("Ada", "ada@example.com", "secret1", "secret1");
    let session = shell.register(&form).await.unwrap();

    assert_eq!(session.identifier, "ada@example.com");
}

#[tokio::test]
async fn test_load_feed_keeps_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(seed_body()))
        .expect(1)
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    assert!(!shell.feed().is_loading());

    assert_eq!(shell.load_feed().await.unwrap(), LoadOutcome::Applied);

    let feed = shell.feed();
    let ids: Vec<_> = feed.posts().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert!(!feed.is_loading());
}

#[tokio::test]
async fn test_failed_load_keeps_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(seed_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    shell.load_feed().await.unwrap();

    let err = shell.load_feed().await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Api(ApiError {
            message: "Request failed (503)".to_string(),
            status_code: 503,
            kind: ApiErrorKind::Status,
        })
    );
    assert_eq!(shell.feed().len(), 2);
}

#[tokio::test]
async fn test_create_post_prepends_trimmed_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(seed_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(body_json(json!({"text": "Hello there"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "srv-9"})))
        .expect(1)
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    shell.load_feed().await.unwrap();

    let post = shell.create_post("   Hello there  ").await.unwrap();

    let feed = shell.feed();
    assert_eq!(feed.len(), 3);
    assert_eq!(feed.posts()[0], post);
    assert_eq!(post.text, "Hello there");
    assert_eq!(post.author, "You");
    assert_ne!(post.id, "srv-9");
    assert!(!feed.is_loading());
}

#[tokio::test]
async fn test_blank_post_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    let before = shell.feed();

    let err = shell.create_post("  \n ").await.unwrap_err();

    assert_eq!(err, ClientError::Validation(ValidationError::EmptyPost));
    assert_eq!(shell.feed(), before);
}

#[tokio::test]
async fn test_rejected_post_is_not_prepended() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Too spicy"})))
        .expect(1)
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    let err = shell.create_post("hello").await.unwrap_err();

    assert_eq!(err.to_string(), "Too spicy");
    assert!(shell.feed().is_empty());
}

#[tokio::test]
async fn test_refresh_always_clears_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(seed_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "down"})))
        .mount(&server)
        .await;

    let shell = shell_for(&server);

    assert!(shell.refresh_feed().await.is_ok());
    let feed = shell.feed();
    assert!(!feed.is_refreshing());
    assert_eq!(feed.len(), 2);

    let err = shell.refresh_feed().await.unwrap_err();
    assert_eq!(err.to_string(), "down");
    let feed = shell.feed();
    assert!(!feed.is_refreshing());
    assert!(!feed.is_loading());
    assert_eq!(feed.len(), 2);
}

#[tokio::test]
async fn test_refresh_replaces_optimistic_post_with_server_view() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "srv-1", "text": "hello", "author": "You", "createdAt": "2024-05-01T13:00:00Z"},
        ])))
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    let optimistic = shell.create_post("hello").await.unwrap();
    assert_eq!(shell.feed().len(), 1);

    shell.refresh_feed().await.unwrap();

    let feed = shell.feed();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed.posts()[0].id, "srv-1");
    assert!(!feed.contains(&optimistic.id));
}

#[tokio::test]
async fn test_refresh_abandoned_by_caller_timeout_clears_flags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(seed_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    let elapsed = tokio::time::timeout(Duration::from_millis(100), shell.refresh_feed()).await;
    assert!(elapsed.is_err());

    let feed = shell.feed();
    assert!(!feed.is_refreshing());
    assert!(!feed.is_loading());
    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_create_abandoned_by_caller_timeout_clears_loading() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let shell = shell_for(&server);
    let elapsed = tokio::time::timeout(Duration::from_millis(100), shell.create_post("hi")).await;
    assert!(elapsed.is_err());

    let feed = shell.feed();
    assert!(!feed.is_loading());
    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_null_post_list_loads_empty_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;

    let shell = shell_for(&server);

    assert_eq!(shell.load_feed().await.unwrap(), LoadOutcome::Applied);
    assert!(shell.feed().is_empty());
}
