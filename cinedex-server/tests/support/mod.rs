#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use anyhow::{Result, anyhow};
use axum_test::TestServer;
use cinedex_core::{
    api::routes::v1,
    database::MemoryStore,
    domain::users::auth::AuthCrypto,
};
use cinedex_server::{
    AppState,
    infra::{
        config::Config,
        startup::{NoopStartupHooks, StartupHooks},
    },
    routes::build_router,
};
use serde_json::{Value, json};

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

/// Strong secrets and a generous rate limit, so only tests that lower it
/// ever see a 429.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret =
        "test-signing-secret-that-is-long-enough-0001".into();
    config.auth.password_pepper =
        "test-pepper-that-is-also-long-enough-0001".into();
    config.auth.token_ttl = Duration::from_secs(600);
    config.rate_limit.max_requests = 10_000;
    config
}

pub async fn build_test_app() -> Result<TestApp> {
    build_test_app_with_config(test_config()).await
}

pub async fn build_test_app_with_config(config: Config) -> Result<TestApp> {
    build_test_app_with_hooks(config, &NoopStartupHooks).await
}

pub async fn build_test_app_with_hooks(
    config: Config,
    hooks: &dyn StartupHooks,
) -> Result<TestApp> {
    let crypto =
        AuthCrypto::insecure_fast(config.auth.password_pepper.as_bytes())
            .map_err(|err| anyhow!(err.to_string()))?;
    let state = AppState::in_memory(config, MemoryStore::new(), crypto);
    hooks.run(&state).await?;

    let make_service = build_router(state.clone())
        .into_make_service_with_connect_info::<SocketAddr>();
    let server = TestServer::builder()
        .http_transport()
        .build(make_service)
        .map_err(|err| anyhow!(err.to_string()))?;

    Ok(TestApp { server, state })
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Register `username` and return the `AuthToken` payload.
pub async fn register(server: &TestServer, username: &str) -> Value {
    let response = server
        .post(v1::auth::REGISTER)
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": PASSWORD,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

/// Register `username` and return its access token.
pub async fn token_for(server: &TestServer, username: &str) -> String {
    register(server, username).await["access_token"]
        .as_str()
        .expect("access token issued")
        .to_string()
}

/// First account registered, hence the administrator.
pub async fn admin_token(server: &TestServer) -> String {
    token_for(server, "admin").await
}

pub fn movie_body(
    title: &str,
    director: &str,
    genres: &[&str],
    rating: f64,
) -> Value {
    json!({
        "title": title,
        "description": format!("{title}, a film by {director}."),
        "director": director,
        "genres": genres,
        "release_year": 2000,
        "duration": 120,
        "rating": rating,
    })
}

/// Create a movie through the API and return it.
pub async fn create_movie(
    server: &TestServer,
    token: &str,
    body: Value,
) -> Value {
    let response = server
        .post(v1::movies::COLLECTION)
        .add_header("Authorization", bearer(token))
        .json(&body)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}
