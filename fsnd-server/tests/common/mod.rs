//! Shared router fixtures: in-memory store plus a static HS256 key set

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use fsnd_server::auth::{JsonWebKey, KeySet, KeySource, StaticKeySource};
use fsnd_server::{build_router, AppState, AuthConfig, Authorizer, MemoryStore, ServerConfig};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const KID: &str = "test-key";
pub const SECRET: &[u8] = b"fsnd-test-signing-secret-of-32-bytes";
pub const DOMAIN: &str = "fsnd.test";
pub const AUDIENCE: &str = "coffee";

pub struct TestApp {
    pub router: Router,
    pub keys: Arc<StaticKeySource>,
}

fn auth_config() -> AuthConfig {
    let mut config = AuthConfig::new(DOMAIN, AUDIENCE);
    config.algorithms = vec![Algorithm::HS256];
    config
}

/// Router over a fresh in-memory store with authorization enabled.
pub fn app() -> TestApp {
    let keys = Arc::new(StaticKeySource::new(KeySet {
        keys: vec![JsonWebKey::oct(KID, SECRET)],
    }));
    let authorizer = Authorizer::new(&auth_config(), keys.clone());
    let state = AppState::new(MemoryStore::new(), Some(authorizer));

    TestApp {
        router: build_router(Arc::new(state), &ServerConfig::default()),
        keys,
    }
}

/// Router whose authorizer reads keys from `source`.
pub fn app_with_keys(source: Arc<dyn KeySource>, config: ServerConfig) -> Router {
    let authorizer = Authorizer::new(&auth_config(), source);
    let state = AppState::new(MemoryStore::new(), Some(authorizer));
    build_router(Arc::new(state), &config)
}

/// Router with no Auth0 settings.
pub fn app_without_auth() -> Router {
    let state = AppState::new(MemoryStore::new(), None);
    build_router(Arc::new(state), &ServerConfig::default())
}

pub fn sign(claims: Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KID.to_owned());
    encode(&header, &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "sub": "auth0|test-user",
        "aud": AUDIENCE,
        "iss": format!("https://{}/", DOMAIN),
        "exp": Utc::now().timestamp() + 3600,
        "permissions": permissions,
    })
}

/// Valid token carrying `permissions`.
pub fn token(permissions: &[&str]) -> String {
    sign(claims(permissions))
}

pub fn barista() -> String {
    token(&["get:drinks-detail"])
}

pub fn manager() -> String {
    token(&[
        "get:drinks-detail",
        "post:drinks",
        "patch:drinks",
        "delete:drinks",
    ])
}

/// Send one request and decode the JSON response body.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, None, None).await
}

pub async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, uri, None, Some(body)).await
}

pub async fn delete(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::DELETE, uri, None, None).await
}

/// Send a body as-is, for malformed JSON.
pub async fn send_raw(router: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
