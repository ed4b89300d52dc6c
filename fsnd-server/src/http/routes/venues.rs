//! Venue endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::http::error::ApiError;
use crate::http::extractors::{Id, JsonBody};
use crate::http::response::{Deleted, Success};
use crate::http::server::AppState;
use crate::models::search::search_term;
use crate::models::venue::group_by_area;
use crate::models::{Area, FieldRule, SearchResults, ShowSplit, Venue, VenueInput, VENUE_FIELDS};

#[derive(Serialize)]
pub struct AreasResponse {
    pub areas: Vec<Area>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub search_term: String,
    #[serde(flatten)]
    pub results: SearchResults,
}

#[derive(Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: Venue,
    #[serde(flatten)]
    pub shows: ShowSplit,
}

#[derive(Serialize)]
pub struct VenueDetailResponse {
    pub venue: VenueDetail,
}

#[derive(Serialize)]
pub struct VenueResponse {
    pub venue: Venue,
}

#[derive(Serialize)]
pub struct FormResponse {
    pub fields: &'static [FieldRule],
}

#[derive(Serialize)]
pub struct EditFormResponse {
    pub id: i32,
    pub form: VenueInput,
    pub fields: &'static [FieldRule],
}

/// GET /venues - venues grouped by city and state
async fn list_venues(State(state): State<Arc<AppState>>) -> Result<Success<AreasResponse>, ApiError> {
    let listings = state.fyyur.venue_listings(Utc::now()).await?;
    Ok(Success::new(AreasResponse {
        areas: group_by_area(listings),
    }))
}

/// POST /venues/search
async fn search_venues(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> Result<Success<SearchResponse>, ApiError> {
    let term = search_term(&input)?;
    let found = state.fyyur.search_venues(&term, Utc::now()).await?;
    Ok(Success::new(SearchResponse {
        search_term: term,
        results: found.into(),
    }))
}

/// GET /venues/{id} - venue with past and upcoming shows
async fn show_venue(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> Result<Success<VenueDetailResponse>, ApiError> {
    let venue = state.fyyur.venue(id).await?;
    let shows = state.fyyur.venue_shows(id).await?;
    Ok(Success::new(VenueDetailResponse {
        venue: VenueDetail {
            venue,
            shows: ShowSplit::at(shows, Utc::now()),
        },
    }))
}

/// GET /venues/create - field list of the venue form
async fn create_form() -> Success<FormResponse> {
    Success::new(FormResponse {
        fields: VENUE_FIELDS,
    })
}

/// POST /venues/create
async fn create_venue(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> Result<Success<VenueResponse>, ApiError> {
    let input = VenueInput::parse(&input)?;
    let venue = state.fyyur.create_venue(input).await?;
    tracing::info!(venue_id = venue.id, name = %venue.name, "venue listed");
    Ok(Success::new(VenueResponse { venue }))
}

/// GET /venues/{id}/edit - form pre-filled from the record
async fn edit_form(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> Result<Success<EditFormResponse>, ApiError> {
    let venue = state.fyyur.venue(id).await?;
    Ok(Success::new(EditFormResponse {
        id,
        form: venue.into(),
        fields: VENUE_FIELDS,
    }))
}

/// POST /venues/{id}/edit - full replacement
async fn edit_venue(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> Result<Success<VenueResponse>, ApiError> {
    let input = VenueInput::parse(&input)?;
    let venue = state.fyyur.update_venue(id, input).await?;
    Ok(Success::new(VenueResponse { venue }))
}

/// DELETE /venues/{id} - also removes the venue's shows
async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> Result<Success<Deleted>, ApiError> {
    state.fyyur.delete_venue(id).await?;
    tracing::info!(venue_id = id, "venue deleted");
    Ok(Success::new(Deleted { deleted: id }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/venues", get(list_venues))
        .route("/venues/search", post(search_venues))
        .route("/venues/create", get(create_form).post(create_venue))
        .route("/venues/{id}", get(show_venue).delete(delete_venue))
        .route("/venues/{id}/edit", get(edit_form).post(edit_venue))
}
