#![allow(dead_code)]

use std::sync::Arc;

use appraise_api::auth::jwt::{Claims, JwtConfig};
use appraise_api::config::ServerConfig;
use appraise_api::router::build_app_router;
use appraise_api::state::AppState;
use appraise_core::memory::InMemoryStore;
use appraise_core::types::DbId;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use tower::ServiceExt;

pub const ADMIN: DbId = 1;
pub const HR: DbId = 2;
pub const MANAGER: DbId = 3;
pub const ALICE: DbId = 10;
pub const BOB: DbId = 11;

const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(admin_override_enabled: bool) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        admin_override_enabled,
        db_max_connections: 1,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            leeway_secs: 60,
        },
    }
}

/// Build the full application router over an in-memory store seeded with the
/// user ids above.
///
/// Uses the same [`build_app_router`] as `main.rs`, so integration tests
/// exercise the production middleware stack.
pub async fn build_test_app(admin_override_enabled: bool) -> (Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    store.add_employees(&[ADMIN, HR, MANAGER, ALICE, BOB]).await;

    let config = test_config(admin_override_enabled);
    let state = AppState::new(store.clone(), config.clone());
    (build_app_router(state, &config), store)
}

/// Mint an access token for `user_id` with the given role name.
pub fn token(user_id: DbId, role: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: now + 900,
        iat: now,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("token encoding should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create an appraisal for `employee_id` as HR and return its id.
pub async fn create_appraisal(app: &Router, employee_id: DbId, cycle: &str) -> DbId {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/appraisals",
        serde_json::json!({
            "employee_id": employee_id,
            "appraisal_cycle": cycle,
            "start_date": "2024-01-01",
            "end_date": "2024-03-31",
        }),
        &token(HR, "hr"),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

pub fn self_review_body(rating: i64) -> serde_json::Value {
    serde_json::json!({
        "strengths": "Mentoring new hires",
        "improvements": "Delegation",
        "achievements": "Shipped the billing rewrite",
        "challenges": "On-call load",
        "self_rating": rating,
    })
}
