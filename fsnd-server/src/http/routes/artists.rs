//! Artist endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

use super::venues::{FormResponse, SearchResponse};
use crate::http::error::ApiError;
use crate::http::extractors::{Id, JsonBody};
use crate::http::response::{Deleted, Success};
use crate::http::server::AppState;
use crate::models::search::search_term;
use crate::models::{Artist, ArtistInput, FieldRule, Listing, ShowSplit, ARTIST_FIELDS};

#[derive(Serialize)]
pub struct ArtistsResponse {
    pub artists: Vec<Listing>,
}

#[derive(Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: Artist,
    #[serde(flatten)]
    pub shows: ShowSplit,
}

#[derive(Serialize)]
pub struct ArtistDetailResponse {
    pub artist: ArtistDetail,
}

#[derive(Serialize)]
pub struct ArtistResponse {
    pub artist: Artist,
}

#[derive(Serialize)]
pub struct EditFormResponse {
    pub id: i32,
    pub form: ArtistInput,
    pub fields: &'static [FieldRule],
}

/// GET /artists
async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> Result<Success<ArtistsResponse>, ApiError> {
    let artists = state.fyyur.artist_listings(Utc::now()).await?;
    Ok(Success::new(ArtistsResponse { artists }))
}

/// POST /artists/search
async fn search_artists(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> Result<Success<SearchResponse>, ApiError> {
    let term = search_term(&input)?;
    let found = state.fyyur.search_artists(&term, Utc::now()).await?;
    Ok(Success::new(SearchResponse {
        search_term: term,
        results: found.into(),
    }))
}

/// GET /artists/{id}
async fn show_artist(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> Result<Success<ArtistDetailResponse>, ApiError> {
    let artist = state.fyyur.artist(id).await?;
    let shows = state.fyyur.artist_shows(id).await?;
    Ok(Success::new(ArtistDetailResponse {
        artist: ArtistDetail {
            artist,
            shows: ShowSplit::at(shows, Utc::now()),
        },
    }))
}

async fn create_form() -> Success<FormResponse> {
    Success::new(FormResponse {
        fields: ARTIST_FIELDS,
    })
}

/// POST /artists/create
async fn create_artist(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> Result<Success<ArtistResponse>, ApiError> {
    let input = ArtistInput::parse(&input)?;
    let artist = state.fyyur.create_artist(input).await?;
    tracing::info!(artist_id = artist.id, name = %artist.name, "artist listed");
    Ok(Success::new(ArtistResponse { artist }))
}

async fn edit_form(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> Result<Success<EditFormResponse>, ApiError> {
    let artist = state.fyyur.artist(id).await?;
    Ok(Success::new(EditFormResponse {
        id,
        form: artist.into(),
        fields: ARTIST_FIELDS,
    }))
}

/// POST /artists/{id}/edit
async fn edit_artist(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> Result<Success<ArtistResponse>, ApiError> {
    let input = ArtistInput::parse(&input)?;
    let artist = state.fyyur.update_artist(id, input).await?;
    Ok(Success::new(ArtistResponse { artist }))
}

/// DELETE /artists/{id}
async fn delete_artist(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> Result<Success<Deleted>, ApiError> {
    state.fyyur.delete_artist(id).await?;
    tracing::info!(artist_id = id, "artist deleted");
    Ok(Success::new(Deleted { deleted: id }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/artists", get(list_artists))
        .route("/artists/search", post(search_artists))
        .route("/artists/create", get(create_form).post(create_artist))
        .route("/artists/{id}", get(show_artist).delete(delete_artist))
        .route("/artists/{id}/edit", get(edit_form).post(edit_artist))
}
