use axum::http::StatusCode;
use axum_test::TestServer;
use kvq_api::ServerConfig;
use serde_json::{json, Value};
use std::time::Duration;

#[path = "support/mod.rs"]
mod support;

use support::{bearer, build_test_app, build_test_app_with, new_user};

async fn post(
    server: &TestServer,
    token: &str,
    path: &str,
    body: Value,
) -> axum_test::TestResponse {
    let (name, value) = bearer(token);
    server.post(path).add_header(name, value).json(&body).await
}

async fn send(server: &TestServer, token: &str, namespace: &str, message: &str) -> String {
    let response = post(
        server,
        token,
        "/queue/send",
        json!({"namespace": namespace, "message": message}),
    )
    .await;
    response.assert_status_ok();
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

async fn receive(server: &TestServer, token: &str, namespace: &str, timeout: i64) -> Option<Value> {
    let response = post(
        server,
        token,
        "/queue/receive",
        json!({"namespace": namespace, "visibilityTimeout": timeout}),
    )
    .await;
    if response.status_code() == StatusCode::NOT_FOUND {
        return None;
    }
    response.assert_status_ok();
    Some(response.json())
}

#[tokio::test]
async fn lease_hides_then_redelivers() {
    let app = build_test_app();
    let token = new_user(&app.server).await;
    let id = send(&app.server, &token, "jobs", "work").await;

    let first = receive(&app.server, &token, "jobs", 1000).await.unwrap();
    assert_eq!(first["id"], id.as_str());
    assert!(receive(&app.server, &token, "jobs", 1000).await.is_none());

    app.clock.advance(Duration::from_millis(1000));
    let again = receive(&app.server, &token, "jobs", 1000).await.unwrap();
    assert_eq!(again["id"], id.as_str());
}

#[tokio::test]
async fn oldest_visible_first() {
    let app = build_test_app();
    let token = new_user(&app.server).await;
    let ids = [
        send(&app.server, &token, "q", "1").await,
        send(&app.server, &token, "q", "2").await,
        send(&app.server, &token, "q", "3").await,
    ];

    for id in &ids {
        let got = receive(&app.server, &token, "q", 60_000).await.unwrap();
        assert_eq!(got["id"], id.as_str());
    }
}

#[tokio::test]
async fn delete_after_redelivery_and_twice() {
    let app = build_test_app();
    let token = new_user(&app.server).await;
    let id = send(&app.server, &token, "q", "m").await;

    receive(&app.server, &token, "q", 10).await.unwrap();
    app.clock.advance(Duration::from_millis(10));
    receive(&app.server, &token, "q", 10).await.unwrap();

    for _ in 0..2 {
        post(&app.server, &token, "/queue/delete", json!({"namespace": "q", "id": id}))
            .await
            .assert_status_ok();
    }
    app.clock.advance(Duration::from_secs(60));
    assert!(receive(&app.server, &token, "q", 10).await.is_none());

    post(&app.server, &token, "/queue/delete", json!({"namespace": "q", "id": "never-existed"}))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn namespaces_and_tenants_are_isolated() {
    let app = build_test_app();
    let alice = new_user(&app.server).await;
    let bob = new_user(&app.server).await;
    let id = send(&app.server, &alice, "jobs", "secret").await;

    assert!(receive(&app.server, &bob, "jobs", 1000).await.is_none());
    assert!(receive(&app.server, &alice, "other", 1000).await.is_none());

    // bob cannot ack alice's message
    post(&app.server, &bob, "/queue/delete", json!({"namespace": "jobs", "id": id}))
        .await
        .assert_status_ok();
    assert_eq!(receive(&app.server, &alice, "jobs", 1000).await.unwrap()["id"], id.as_str());
}

#[tokio::test]
async fn visibility_timeout_defaults_and_clamps() {
    let config = ServerConfig {
        default_visibility_timeout_ms: 100,
        max_visibility_timeout_ms: 500,
        ..Default::default()
    };
    let app = build_test_app_with(config);
    let token = new_user(&app.server).await;
    send(&app.server, &token, "q", "a").await;
    send(&app.server, &token, "q", "b").await;

    // No timeout given: default lease
    let response = post(&app.server, &token, "/queue/receive", json!({"namespace": "q"})).await;
    response.assert_status_ok();
    // Huge timeout: clamped to the maximum
    receive(&app.server, &token, "q", 10_000_000).await.unwrap();

    app.clock.advance(Duration::from_millis(100));
    assert_eq!(receive(&app.server, &token, "q", 1000).await.unwrap()["message"], "a");
    assert!(receive(&app.server, &token, "q", 1000).await.is_none());

    app.clock.advance(Duration::from_millis(400));
    assert_eq!(receive(&app.server, &token, "q", 1000).await.unwrap()["message"], "b");
}

#[tokio::test]
async fn invalid_queue_requests_are_400() {
    let app = build_test_app();
    let token = new_user(&app.server).await;

    post(&app.server, &token, "/queue/send", json!({"namespace": "", "message": "m"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    post(&app.server, &token, "/queue/send", json!({"namespace": "q"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    post(&app.server, &token, "/queue/receive", json!({"namespace": "q", "visibilityTimeout": -1}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sweeper_releases_leases_seen_by_health() {
    let app = build_test_app();
    let token = new_user(&app.server).await;
    send(&app.server, &token, "q", "m").await;
    receive(&app.server, &token, "q", 100).await.unwrap();

    app.clock.advance(Duration::from_millis(100));
    let report = app.state.sweeper().sweep_once();
    assert_eq!(report.leases_released, 1);

    let health: Value = app.server.get("/health").await.json();
    assert_eq!(health["messages_visible"], 1);
    assert_eq!(health["messages_leased"], 0);
}
