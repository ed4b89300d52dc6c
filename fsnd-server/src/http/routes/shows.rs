//! Show endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Router};
use serde::Serialize;
use serde_json::{Map, Value};

use super::venues::FormResponse;
use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::http::response::Success;
use crate::http::server::AppState;
use crate::models::{NewShow, ShowDetail, SHOW_FIELDS};

#[derive(Serialize)]
pub struct ShowsResponse {
    pub shows: Vec<ShowDetail>,
}

#[derive(Serialize)]
pub struct ShowResponse {
    pub show: ShowDetail,
}

/// GET /shows - every show in start-time order
async fn list_shows(State(state): State<Arc<AppState>>) -> Result<Success<ShowsResponse>, ApiError> {
    let shows = state.fyyur.shows().await?;
    Ok(Success::new(ShowsResponse { shows }))
}

async fn create_form() -> Success<FormResponse> {
    Success::new(FormResponse {
        fields: SHOW_FIELDS,
    })
}

/// POST /shows/create
async fn create_show(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> Result<Success<ShowResponse>, ApiError> {
    let show = NewShow::parse(&input)?;
    let show = state.fyyur.create_show(show).await?;
    tracing::info!(
        show_id = show.id,
        artist_id = show.artist_id,
        venue_id = show.venue_id,
        "show listed"
    );
    Ok(Success::new(ShowResponse { show }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shows", get(list_shows))
        .route("/shows/create", get(create_form).post(create_show))
}
