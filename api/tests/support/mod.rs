#![allow(dead_code)]

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use kvq_api::{build_router, ApiState, ServerConfig};
use kvq_common::ManualClock;
use serde_json::Value;
use std::sync::Arc;

pub const T0: u64 = 1_700_000_000_000;

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<ApiState>,
    pub clock: Arc<ManualClock>,
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(ServerConfig::default())
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let clock = Arc::new(ManualClock::new(T0));
    let state = Arc::new(ApiState::new(config, clock.clone()));
    let server = TestServer::new(build_router(state.clone())).expect("test server");
    TestApp { server, state, clock }
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
    )
}

pub async fn new_user(server: &TestServer) -> String {
    let response = server.post("/user/new").await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"].as_str().expect("token in response").to_string()
}
