mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use common::{app, delete, get, post};

fn venue(name: &str, city: &str, state: &str) -> Value {
    json!({
        "name": name,
        "city": city,
        "state": state,
        "address": "1015 Folsom Street",
        "phone": "123-123-1234",
        "genres": ["Jazz", "Reggae"],
        "seeking_talent": true,
        "seeking_description": "Looking for local artists",
        "image_link": "https://images.example.com/hop.jpg"
    })
}

fn artist(name: &str) -> Value {
    json!({
        "name": name,
        "city": "San Francisco",
        "state": "CA",
        "genres": "Rock n Roll",
        "seeking_venue": "y"
    })
}

async fn create(router: &axum::Router, uri: &str, key: &str, body: Value) -> i64 {
    let (status, response) = post(router, uri, body).await;
    assert_eq!(status, StatusCode::OK, "{response}");
    response[key]["id"].as_i64().unwrap()
}

async fn create_show(router: &axum::Router, artist_id: i64, venue_id: i64, offset: Duration) -> i64 {
    let body = json!({
        "artist_id": artist_id,
        "venue_id": venue_id,
        "start_time": (Utc::now() + offset).to_rfc3339(),
    });
    create(router, "/shows/create", "show", body).await
}

#[tokio::test]
async fn health_needs_no_store() {
    let app = app();
    let (status, body) = get(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["success"], true);
    assert_eq!(body["authorization"], true);
}

#[tokio::test]
async fn venues_are_grouped_by_area() {
    let app = app();
    let hop = create(&app.router, "/venues/create", "venue", venue("The Musical Hop", "San Francisco", "CA")).await;
    let dueling = create(&app.router, "/venues/create", "venue", venue("The Dueling Pianos Bar", "New York", "NY")).await;
    let park = create(&app.router, "/venues/create", "venue", venue("Park Square Live", "San Francisco", "CA")).await;

    let (status, body) = get(&app.router, "/venues").await;
    assert_eq!(status, StatusCode::OK);

    let areas = body["areas"].as_array().unwrap();
    assert_eq!(areas.len(), 2);
    assert_eq!(areas[0]["city"], "New York");
    assert_eq!(areas[0]["venues"][0]["id"], dueling);
    assert_eq!(areas[1]["city"], "San Francisco");
    assert_eq!(areas[1]["venues"][0]["id"], hop);
    assert_eq!(areas[1]["venues"][1]["id"], park);
    assert_eq!(areas[1]["venues"][0]["num_upcoming_shows"], 0);
}

#[tokio::test]
async fn venue_detail_splits_shows_around_now() {
    let app = app();
    let hop = create(&app.router, "/venues/create", "venue", venue("The Musical Hop", "San Francisco", "CA")).await;
    let band = create(&app.router, "/artists/create", "artist", artist("Guns N Petals")).await;

    create_show(&app.router, band, hop, Duration::days(-30)).await;
    let soon = create_show(&app.router, band, hop, Duration::days(2)).await;
    let later = create_show(&app.router, band, hop, Duration::days(9)).await;

    let (status, body) = get(&app.router, &format!("/venues/{hop}")).await;
    assert_eq!(status, StatusCode::OK);
    let detail = &body["venue"];
    assert_eq!(detail["name"], "The Musical Hop");
    assert_eq!(detail["genres"], json!(["Jazz", "Reggae"]));
    assert_eq!(detail["past_shows_count"], 1);
    assert_eq!(detail["upcoming_shows_count"], 2);
    assert_eq!(detail["upcoming_shows"][0]["id"], soon);
    assert_eq!(detail["upcoming_shows"][1]["id"], later);
    assert_eq!(detail["past_shows"][0]["artist_name"], "Guns N Petals");

    let (_, body) = get(&app.router, &format!("/artists/{band}")).await;
    assert_eq!(body["artist"]["upcoming_shows_count"], 2);
    assert_eq!(body["artist"]["past_shows"][0]["venue_name"], "The Musical Hop");
    assert_eq!(body["artist"]["genres"], json!(["Rock n Roll"]));
    assert_eq!(body["artist"]["seeking_venue"], true);

    let (_, body) = get(&app.router, "/venues").await;
    assert_eq!(body["areas"][0]["venues"][0]["num_upcoming_shows"], 2);
}

#[tokio::test]
async fn show_with_unknown_artist_or_venue_is_rejected() {
    let app = app();
    let hop = create(&app.router, "/venues/create", "venue", venue("The Musical Hop", "San Francisco", "CA")).await;

    let (status, body) = post(
        &app.router,
        "/shows/create",
        json!({"artist_id": 77, "venue_id": hop, "start_time": "2035-04-01 20:00:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");

    let (status, _) = post(
        &app.router,
        "/shows/create",
        json!({"artist_id": 1, "venue_id": hop, "start_time": "next tuesday"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn search_matches_names_case_insensitively() {
    let app = app();
    create(&app.router, "/venues/create", "venue", venue("The Musical Hop", "San Francisco", "CA")).await;
    create(&app.router, "/venues/create", "venue", venue("Park Square Live Music & Coffee", "San Francisco", "CA")).await;
    create(&app.router, "/venues/create", "venue", venue("The Dueling Pianos Bar", "New York", "NY")).await;

    let (status, body) = post(&app.router, "/venues/search", json!({"search_term": "MUSIC"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["search_term"], "MUSIC");

    let (status, _) = post(&app.router, "/venues/search", json!({"search_term": ""})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    create(&app.router, "/artists/create", "artist", artist("Guns N Petals")).await;
    let (_, body) = post(&app.router, "/artists/search", json!({"search_term": "petal"})).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Guns N Petals");
}

#[tokio::test]
async fn edit_form_round_trip() {
    let app = app();
    let hop = create(&app.router, "/venues/create", "venue", venue("The Musical Hop", "San Francisco", "CA")).await;

    let (status, body) = get(&app.router, &format!("/venues/{hop}/edit")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["name"], "The Musical Hop");
    assert!(body["fields"].as_array().unwrap().iter().any(|f| f["name"] == "genres"));

    let mut changed = venue("The Musical Hop", "Oakland", "CA");
    changed["phone"] = Value::Null;
    let (status, body) = post(&app.router, &format!("/venues/{hop}/edit"), changed).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["venue"]["city"], "Oakland");
    assert_eq!(body["venue"]["phone"], Value::Null);

    let (status, _) = post(&app.router, "/venues/999/edit", venue("Nowhere", "Oakland", "CA")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejects_invalid_venue() {
    let app = app();
    let mut bad = venue("The Musical Hop", "San Francisco", "CA");
    bad["website"] = json!("not a url");
    let (status, body) = post(&app.router, "/venues/create", bad).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("website"));

    let mut bad = venue("x", "San Francisco", "CA");
    bad["name"] = json!("n".repeat(121));
    let (status, _) = post(&app.router, "/venues/create", bad).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let mut bad = venue("x", "San Francisco", "CA");
    bad["phone"] = json!("555-CALL-NOW");
    let (status, body) = post(&app.router, "/venues/create", bad).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("phone"));

    let (status, body) = post(&app.router, "/venues/create", venue("x", "San Francisco", "ZZ")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("state"));
}

#[tokio::test]
async fn deleting_a_venue_removes_its_shows() {
    let app = app();
    let hop = create(&app.router, "/venues/create", "venue", venue("The Musical Hop", "San Francisco", "CA")).await;
    let band = create(&app.router, "/artists/create", "artist", artist("Guns N Petals")).await;
    create_show(&app.router, band, hop, Duration::days(3)).await;

    let (_, body) = get(&app.router, "/shows").await;
    assert_eq!(body["shows"].as_array().unwrap().len(), 1);

    let (status, body) = delete(&app.router, &format!("/venues/{hop}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], hop);

    let (_, body) = get(&app.router, "/shows").await;
    assert_eq!(body["shows"], json!([]));

    let (status, _) = get(&app.router, &format!("/venues/{hop}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app.router, &format!("/artists/{band}")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = get(&app.router, "/artists").await;
    assert_eq!(body["artists"], json!([]));
}

#[tokio::test]
async fn home_lists_most_recent_first() {
    let app = app();
    for i in 0..12 {
        create(&app.router, "/venues/create", "venue", venue(&format!("Venue {i}"), "Austin", "TX")).await;
    }
    let band = create(&app.router, "/artists/create", "artist", artist("Matt Quevedo")).await;

    let (status, body) = get(&app.router, "/").await;
    assert_eq!(status, StatusCode::OK);
    let recent = body["recent_venues"].as_array().unwrap();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0]["name"], "Venue 11");
    assert_eq!(body["recent_artists"][0]["id"], band);
}

#[tokio::test]
async fn create_forms_describe_fields() {
    let app = app();
    let (status, body) = get(&app.router, "/shows/create").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["artist_id", "venue_id", "start_time"]);

    let (_, body) = get(&app.router, "/artists/create").await;
    assert!(body["fields"].as_array().unwrap().iter().all(|f| f["name"] != "address"));
}
