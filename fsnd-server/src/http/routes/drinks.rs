//! Coffee shop drink endpoints
//!
//! Everything except the public menu requires a bearer token carrying the
//! route's permission. The token extractor runs first and authorization
//! happens before the body is inspected or the id looked up.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, patch},
    Router,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::auth::BearerToken;
use crate::http::error::ApiError;
use crate::http::extractors::{Id, JsonBody};
use crate::http::response::Success;
use crate::http::server::AppState;
use crate::models::{DrinkPatch, LongDrink, NewDrink, ShortDrink};

pub const READ_DETAIL: &str = "get:drinks-detail";
pub const CREATE: &str = "post:drinks";
pub const UPDATE: &str = "patch:drinks";
pub const DELETE: &str = "delete:drinks";

#[derive(Serialize)]
pub struct MenuResponse {
    pub drinks: Vec<ShortDrink>,
}

#[derive(Serialize)]
pub struct DetailResponse {
    pub drinks: Vec<LongDrink>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub delete: i32,
}

type Body = Result<JsonBody<Map<String, Value>>, ApiError>;

/// GET /drinks - public menu
async fn menu(State(state): State<Arc<AppState>>) -> Result<Success<MenuResponse>, ApiError> {
    let drinks = state.coffee.drinks().await?;
    Ok(Success::new(MenuResponse {
        drinks: drinks.iter().map(|d| d.short()).collect(),
    }))
}

/// GET /drinks-detail
async fn detail(
    token: BearerToken,
    State(state): State<Arc<AppState>>,
) -> Result<Success<DetailResponse>, ApiError> {
    state.authorize(READ_DETAIL, &token).await?;
    let drinks = state.coffee.drinks().await?;
    Ok(Success::new(DetailResponse {
        drinks: drinks.into_iter().map(|d| d.long()).collect(),
    }))
}

/// POST /drinks
async fn create_drink(
    token: BearerToken,
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Result<Success<DetailResponse>, ApiError> {
    state.authorize(CREATE, &token).await?;
    let JsonBody(input) = body?;

    let drink = NewDrink::parse(&input)?;
    let drink = state.coffee.create_drink(drink).await?;
    tracing::info!(drink_id = drink.id, title = %drink.title, "drink created");
    Ok(Success::new(DetailResponse {
        drinks: vec![drink.long()],
    }))
}

/// PATCH /drinks/{id} - absent fields keep their values
async fn update_drink(
    token: BearerToken,
    State(state): State<Arc<AppState>>,
    Id(id): Id,
    body: Body,
) -> Result<Success<DetailResponse>, ApiError> {
    state.authorize(UPDATE, &token).await?;
    let JsonBody(input) = body?;

    let patch = DrinkPatch::parse(&input)?;
    let drink = state.coffee.update_drink(id, patch).await?;
    Ok(Success::new(DetailResponse {
        drinks: vec![drink.long()],
    }))
}

/// DELETE /drinks/{id}
async fn delete_drink(
    token: BearerToken,
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> Result<Success<DeleteResponse>, ApiError> {
    state.authorize(DELETE, &token).await?;
    state.coffee.delete_drink(id).await?;
    tracing::info!(drink_id = id, "drink deleted");
    Ok(Success::new(DeleteResponse { delete: id }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drinks", get(menu).post(create_drink))
        .route("/drinks-detail", get(detail))
        .route("/drinks/{id}", patch(update_drink).delete(delete_drink))
}
