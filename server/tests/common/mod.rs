#![allow(dead_code)]

use axum_test::TestServer;
use convo_server::auth::encode_jwt;
use convo_server::core::AppState;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use std::sync::Arc;

pub const TEST_JWT_SECRET: &str = "a-test-secret-that-is-long-enough-for-hs256";

/// Builds an AppState for tests
///
/// # Arguments
/// * `pool` - SQLite pool prepared by `#[sqlx::test]`
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, TEST_JWT_SECRET.to_string(), 24, 64))
}

/// Builds a TestServer around the full application router
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = convo_server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// A valid token for a fixture user, signed with the test secret
pub fn create_test_jwt(user_id: &str, username: &str) -> String {
    encode_jwt(username, user_id, TEST_JWT_SECRET, 24).expect("Failed to create JWT token")
}

/// Posts a GraphQL operation and returns the JSON body.
pub async fn gql(server: &TestServer, token: Option<&str>, query: &str, variables: Value) -> Value {
    let request = server
        .post("/graphql")
        .json(&json!({ "query": query, "variables": variables }));
    let request = match token {
        Some(token) => request.authorization_bearer(token),
        None => request,
    };

    let response = request.await;
    response.assert_status_ok();
    response.json::<Value>()
}

/// Message of the first GraphQL error, if any
pub fn first_error(body: &Value) -> Option<&str> {
    body["errors"][0]["message"].as_str()
}

/// Registers a user through `signIn` and returns `(token, user_id)`.
pub async fn sign_in(server: &TestServer, username: &str, password: &str) -> (String, String) {
    let body = gql(
        server,
        None,
        r#"mutation($username: String!, $password: String!) {
            signIn(username: $username, password: $password) { token user { id username } }
        }"#,
        json!({ "username": username, "password": password }),
    )
    .await;

    assert!(body["errors"].is_null(), "signIn failed: {body}");
    let payload = &body["data"]["signIn"];
    (
        payload["token"].as_str().expect("token").to_string(),
        payload["user"]["id"].as_str().expect("user id").to_string(),
    )
}
