//! Liveness check; never touches the store

use std::sync::Arc;

use axum::{extract::State, routing::get, Router};
use serde::Serialize;

use crate::http::response::Success;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether guarded drink routes can verify tokens
    pub authorization: bool,
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Success<HealthResponse> {
    Success::new(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        authorization: state.authorizer.is_some(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
