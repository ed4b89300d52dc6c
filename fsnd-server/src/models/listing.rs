//! Compact venue/artist rows used by list and search pages

use serde::Serialize;
use sqlx::FromRow;

/// Id, name and number of upcoming shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Listing {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: i64,
}

/// Search response body
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<Listing>,
}

impl From<Vec<Listing>> for SearchResults {
    fn from(data: Vec<Listing>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}
