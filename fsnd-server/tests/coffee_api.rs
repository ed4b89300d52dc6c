mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use chrono::Utc;
use fsnd_server::auth::{AuthError, KeySet, KeySource};
use fsnd_server::ServerConfig;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use common::{
    app, app_with_keys, app_without_auth, barista, claims, get, manager, send, sign, token,
};

fn latte() -> Value {
    json!({
        "title": "Latte",
        "recipe": [
            {"name": "Espresso", "color": "brown", "parts": 1},
            {"name": "Milk", "color": "white", "parts": 3}
        ]
    })
}

async fn create_drink(router: &axum::Router, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, "/drinks", Some(&manager()), Some(body)).await
}

#[tokio::test]
async fn menu_is_public_and_short() {
    let app = app();
    let (status, body) = get(&app.router, "/drinks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "drinks": []}));

    let (status, _) = create_drink(&app.router, latte()).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app.router, "/drinks").await;
    assert_eq!(
        body["drinks"][0]["recipe"],
        json!([{"color": "brown", "parts": 1}, {"color": "white", "parts": 3}])
    );
}

#[tokio::test]
async fn created_recipe_round_trips_through_detail() {
    let app = app();
    let (status, body) = create_drink(&app.router, latte()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["drinks"][0]["title"], "Latte");

    let (status, body) = send(&app.router, Method::GET, "/drinks-detail", Some(&barista()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drinks"][0]["recipe"], latte()["recipe"]);
}

#[tokio::test]
async fn single_ingredient_recipe_is_accepted() {
    let app = app();
    let (status, body) = create_drink(
        &app.router,
        json!({"title": "Water", "recipe": {"name": "Water", "color": "blue", "parts": 1}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        body["drinks"][0]["recipe"],
        json!([{"name": "Water", "color": "blue", "parts": 1}])
    );
}

#[tokio::test]
async fn guarded_routes_require_a_token() {
    let app = app();

    let (status, body) = get(&app.router, "/drinks-detail").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "authorization_header_missing");

    let (status, _) = send(&app.router, Method::POST, "/drinks", None, Some(latte())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn permissions_are_enforced() {
    let app = app();
    let (status, body) =
        send(&app.router, Method::POST, "/drinks", Some(&barista()), Some(latte())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "unauthorized");

    let (status, body) = send(
        &app.router,
        Method::DELETE,
        "/drinks/1",
        Some(&token(&["post:drinks"])),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
}

#[tokio::test]
async fn patch_checks_authorization_before_lookup() {
    let app = app();
    let body = Some(json!({"title": "Mocha"}));

    let (status, _) = send(&app.router, Method::PATCH, "/drinks/42", None, body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app.router, Method::PATCH, "/drinks/abc", None, body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        send(&app.router, Method::PATCH, "/drinks/42", Some(&barista()), body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        send(&app.router, Method::PATCH, "/drinks/42", Some(&manager()), body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn patch_updates_only_given_fields() {
    let app = app();
    let (_, body) = create_drink(&app.router, latte()).await;
    let id = body["drinks"][0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app.router,
        Method::PATCH,
        &format!("/drinks/{id}"),
        Some(&manager()),
        Some(json!({"title": "Flat White"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["drinks"][0]["title"], "Flat White");
    assert_eq!(body["drinks"][0]["recipe"], latte()["recipe"]);
}

#[tokio::test]
async fn duplicate_title_is_rejected() {
    let app = app();
    let (status, _) = create_drink(&app.router, latte()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = create_drink(&app.router, latte()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn invalid_recipes_are_rejected() {
    let app = app();
    let (status, _) = create_drink(&app.router, json!({"title": "Air", "recipe": []})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = create_drink(&app.router, json!({"title": "Air"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = create_drink(
        &app.router,
        json!({"title": "Air", "recipe": [{"name": "Air", "color": "clear", "parts": 0}]}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn deletes_drink() {
    let app = app();
    let (_, body) = create_drink(&app.router, latte()).await;
    let id = body["drinks"][0]["id"].as_i64().unwrap();
    let uri = format!("/drinks/{id}");

    let (status, body) = send(&app.router, Method::DELETE, &uri, Some(&manager()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "delete": id}));

    let (status, _) = send(&app.router, Method::DELETE, &uri, Some(&manager()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn token_failures_map_to_statuses() {
    let app = app();

    let mut expired = claims(&["get:drinks-detail"]);
    expired["exp"] = json!(Utc::now().timestamp() - 3600);
    let (status, body) =
        send(&app.router, Method::GET, "/drinks-detail", Some(&sign(expired)), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "token_expired");

    let mut wrong_audience = claims(&["get:drinks-detail"]);
    wrong_audience["aud"] = json!("trivia");
    let (status, body) = send(
        &app.router,
        Method::GET,
        "/drinks-detail",
        Some(&sign(wrong_audience)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_claims");

    let mut no_permissions = claims(&[]);
    no_permissions.as_object_mut().unwrap().remove("permissions");
    let (status, _) = send(
        &app.router,
        Method::GET,
        "/drinks-detail",
        Some(&sign(no_permissions)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        send(&app.router, Method::GET, "/drinks-detail", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_header");
}

#[tokio::test]
async fn malformed_authorization_header() {
    let app = app();
    let request = axum::http::Request::builder()
        .uri("/drinks-detail")
        .header("Authorization", format!("Token {}", barista()))
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn key_set_is_fetched_once_across_requests() {
    let app = app();
    for _ in 0..5 {
        let (status, _) =
            send(&app.router, Method::GET, "/drinks-detail", Some(&barista()), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(app.keys.fetch_count(), 1);
}

#[tokio::test]
async fn unconfigured_auth_is_unavailable() {
    let router = app_without_auth();
    let (status, body) = send(&router, Method::GET, "/drinks-detail", Some(&barista()), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "key_set_unavailable");

    let (status, _) = get(&router, "/drinks").await;
    assert_eq!(status, StatusCode::OK);
}

/// Key source that answers after `delay`
struct SlowKeySource {
    delay: Duration,
}

#[async_trait]
impl KeySource for SlowKeySource {
    async fn fetch(&self) -> Result<KeySet, AuthError> {
        tokio::time::sleep(self.delay).await;
        Ok(KeySet::default())
    }
}

#[tokio::test]
async fn slow_request_times_out_with_envelope() {
    let config = ServerConfig {
        request_timeout: Duration::from_millis(20),
        ..ServerConfig::default()
    };
    let source = Arc::new(SlowKeySource {
        delay: Duration::from_millis(300),
    });
    let router = app_with_keys(source, config);

    let (status, body) = send(&router, Method::GET, "/drinks-detail", Some(&barista()), None).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], 408);
    assert_eq!(body["code"], "timeout");
}

#[tokio::test]
async fn unknown_kids_do_not_refetch_key_set() {
    let app = app();
    let (status, _) = send(&app.router, Method::GET, "/drinks-detail", Some(&barista()), None).await;
    assert_eq!(status, StatusCode::OK);

    for i in 0..20 {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(format!("unknown-{i}"));
        let forged = encode(
            &header,
            &claims(&["get:drinks-detail"]),
            &EncodingKey::from_secret(b"not-the-tenant-signing-secret"),
        )
        .unwrap();

        let (status, body) =
            send(&app.router, Method::GET, "/drinks-detail", Some(&forged), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_header");
    }

    assert_eq!(app.keys.fetch_count(), 1);
}
