#![allow(dead_code)]

use axum::http::StatusCode;
use axum_test::TestServer;
use core_api::AppState;
use core_auth::InMemoryIdentityProvider;
use core_library::db::create_test_pool;
use core_library::SqliteLyricsRepository;
use core_runtime::config::ServerConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const PASSWORD: &str = "secret1";
pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";

/// Config whose rate limit stays out of the way of CRUD tests.
pub fn relaxed_config() -> ServerConfig {
    ServerConfig::builder()
        .rate_limit(10_000, Duration::from_secs(15 * 60))
        .build()
        .unwrap()
}

pub async fn test_state(config: ServerConfig) -> AppState {
    let pool = create_test_pool().await.unwrap();
    let repository = SqliteLyricsRepository::with_quota(pool, config.lyrics_quota);
    let identity = InMemoryIdentityProvider::new()
        .with_account(ALICE, PASSWORD)
        .await
        .unwrap()
        .with_account(BOB, PASSWORD)
        .await
        .unwrap();

    AppState::new(config, Arc::new(repository), Arc::new(identity))
}

pub async fn test_server(config: ServerConfig) -> TestServer {
    let state = test_state(config).await;
    TestServer::builder()
        .save_cookies()
        .build(core_api::router(state))
        .unwrap()
}

pub async fn login(server: &TestServer, email: &str) {
    server
        .post("/users/login")
        .json(&json!({"email": email, "password": PASSWORD}))
        .await
        .assert_status_ok();
}

pub async fn logout(server: &TestServer) {
    server.post("/users/logout").await.assert_status_ok();
}

/// Creates a document and returns its id.
pub async fn create(server: &TestServer, title: &str, content: &str) -> String {
    let response = server
        .post("/api/lyrics")
        .json(&json!({"title": title, "content": content}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["id"].as_str().unwrap().to_string()
}
