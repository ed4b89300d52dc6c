//! Fyyur landing page data

use std::sync::Arc;

use axum::{extract::State, routing::get, Router};
use chrono::Utc;
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::response::Success;
use crate::http::server::AppState;
use crate::models::{Listing, PAGE_SIZE};

#[derive(Serialize)]
pub struct HomeResponse {
    pub recent_venues: Vec<Listing>,
    pub recent_artists: Vec<Listing>,
}

/// GET / - most recently listed venues and artists
async fn home(State(state): State<Arc<AppState>>) -> Result<Success<HomeResponse>, ApiError> {
    let now = Utc::now();
    let recent_venues = state.fyyur.recent_venues(PAGE_SIZE, now).await?;
    let recent_artists = state.fyyur.recent_artists(PAGE_SIZE, now).await?;

    Ok(Success::new(HomeResponse {
        recent_venues,
        recent_artists,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(home))
}
