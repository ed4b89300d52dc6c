//! Success envelope

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// `{"success": true, ...body}` with status 200
#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{"deleted": id}`
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: i32,
}

/// `{"created": id}`
#[derive(Debug, Serialize)]
pub struct Created {
    pub created: i32,
}
