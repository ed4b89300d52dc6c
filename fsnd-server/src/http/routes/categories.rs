//! Trivia category endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get},
    Router,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::http::error::ApiError;
use crate::http::extractors::{Id, JsonBody};
use crate::http::response::{Created, Deleted, Success};
use crate::http::server::AppState;
use crate::models::{Category, CategoryLabel, Question};

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Serialize)]
pub struct CategoryQuestionsResponse {
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub current_category: Category,
}

/// GET /categories
async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Success<CategoriesResponse>, ApiError> {
    let categories = state.trivia.categories().await?;
    Ok(Success::new(CategoriesResponse { categories }))
}

/// POST /categories
async fn create_category(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> Result<Success<Created>, ApiError> {
    let label = CategoryLabel::parse(&input)?;
    let category = state.trivia.create_category(label.into_string()).await?;
    tracing::info!(category_id = category.id, kind = %category.kind, "category created");
    Ok(Success::new(Created {
        created: category.id,
    }))
}

/// DELETE /categories/{id} - removes its questions too
async fn delete_category(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> Result<Success<Deleted>, ApiError> {
    state.trivia.delete_category(id).await?;
    tracing::info!(category_id = id, "category deleted");
    Ok(Success::new(Deleted { deleted: id }))
}

/// GET /categories/{id}/questions
async fn category_questions(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> Result<Success<CategoryQuestionsResponse>, ApiError> {
    let current_category = state.trivia.category(id).await?;
    let questions = state.trivia.questions_in_category(id).await?;
    Ok(Success::new(CategoryQuestionsResponse {
        total_questions: questions.len(),
        questions,
        current_category,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", delete(delete_category))
        .route("/categories/{id}/questions", get(category_questions))
}
