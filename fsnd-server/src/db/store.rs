//! Store traits shared by the PostgreSQL and in-memory backends

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    Artist, ArtistInput, Category, Drink, DrinkPatch, Listing, LocatedListing, NewDrink,
    NewQuestion, NewShow, Page, Paginated, Question, ShowDetail, Venue, VenueInput,
};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: i64 },

    #[error("{field} references missing record {id}")]
    UnknownReference { field: &'static str, id: i64 },

    #[error("duplicate {field}: '{value}'")]
    Duplicate { field: &'static str, value: String },

    #[error("corrupt {resource} record {id}: {reason}")]
    Corrupt {
        resource: &'static str,
        id: i64,
        reason: String,
    },
}

impl StoreError {
    pub fn not_found(resource: &'static str, id: i32) -> Self {
        Self::NotFound {
            resource,
            id: i64::from(id),
        }
    }

    pub fn unknown_reference(field: &'static str, id: i32) -> Self {
        Self::UnknownReference {
            field,
            id: i64::from(id),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Venues, artists and shows
#[async_trait]
pub trait FyyurStore: Send + Sync {
    /// All venues ordered by (city, state, id).
    async fn venue_listings(&self, now: DateTime<Utc>) -> StoreResult<Vec<LocatedListing>>;

    /// Venues whose name contains `term`, case-insensitively, ordered by id.
    async fn search_venues(&self, term: &str, now: DateTime<Utc>) -> StoreResult<Vec<Listing>>;

    /// Most recently listed venues first.
    async fn recent_venues(&self, limit: u32, now: DateTime<Utc>) -> StoreResult<Vec<Listing>>;

    async fn venue(&self, id: i32) -> StoreResult<Venue>;

    /// Shows at a venue; `NotFound` if the venue doesn't exist.
    async fn venue_shows(&self, id: i32) -> StoreResult<Vec<ShowDetail>>;

    async fn create_venue(&self, input: VenueInput) -> StoreResult<Venue>;

    async fn update_venue(&self, id: i32, input: VenueInput) -> StoreResult<Venue>;

    /// Delete a venue and its shows.
    async fn delete_venue(&self, id: i32) -> StoreResult<()>;

    /// All artists ordered by id.
    async fn artist_listings(&self, now: DateTime<Utc>) -> StoreResult<Vec<Listing>>;

    async fn search_artists(&self, term: &str, now: DateTime<Utc>) -> StoreResult<Vec<Listing>>;

    async fn recent_artists(&self, limit: u32, now: DateTime<Utc>) -> StoreResult<Vec<Listing>>;

    async fn artist(&self, id: i32) -> StoreResult<Artist>;

    async fn artist_shows(&self, id: i32) -> StoreResult<Vec<ShowDetail>>;

    async fn create_artist(&self, input: ArtistInput) -> StoreResult<Artist>;

    async fn update_artist(&self, id: i32, input: ArtistInput) -> StoreResult<Artist>;

    /// Delete an artist and their shows.
    async fn delete_artist(&self, id: i32) -> StoreResult<()>;

    /// All shows ordered by (start_time, id).
    async fn shows(&self) -> StoreResult<Vec<ShowDetail>>;

    /// `UnknownReference` if the artist or venue doesn't exist.
    async fn create_show(&self, show: NewShow) -> StoreResult<ShowDetail>;
}

/// Trivia categories and questions
#[async_trait]
pub trait TriviaStore: Send + Sync {
    /// All categories ordered by id.
    async fn categories(&self) -> StoreResult<Vec<Category>>;

    async fn category(&self, id: i32) -> StoreResult<Category>;

    async fn create_category(&self, kind: String) -> StoreResult<Category>;

    /// Delete a category and every question in it.
    async fn delete_category(&self, id: i32) -> StoreResult<()>;

    /// One page of questions in id order.
    async fn questions_page(&self, page: Page) -> StoreResult<Paginated<Question>>;

    async fn questions_in_category(&self, id: i32) -> StoreResult<Vec<Question>>;

    /// Questions whose text contains `term`, case-insensitively, in id order.
    async fn search_questions(&self, term: &str) -> StoreResult<Vec<Question>>;

    /// `UnknownReference` if the category doesn't exist.
    async fn create_question(&self, question: NewQuestion) -> StoreResult<Question>;

    async fn delete_question(&self, id: i32) -> StoreResult<()>;

    /// Questions not in `exclude`, optionally limited to one category.
    async fn quiz_candidates(
        &self,
        category: Option<i32>,
        exclude: &[i32],
    ) -> StoreResult<Vec<Question>>;
}

/// Coffee shop drinks
#[async_trait]
pub trait CoffeeStore: Send + Sync {
    /// All drinks ordered by id.
    async fn drinks(&self) -> StoreResult<Vec<Drink>>;

    /// `Duplicate` if the title is taken.
    async fn create_drink(&self, drink: NewDrink) -> StoreResult<Drink>;

    async fn update_drink(&self, id: i32, patch: DrinkPatch) -> StoreResult<Drink>;

    async fn delete_drink(&self, id: i32) -> StoreResult<()>;
}
