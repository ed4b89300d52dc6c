//! Trivia question endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::http::error::ApiError;
use crate::http::extractors::{Id, JsonBody};
use crate::http::response::{Created, Deleted, Success};
use crate::http::server::AppState;
use crate::models::search::search_term;
use crate::models::{Category, NewQuestion, Page, PageParams, Question};

#[derive(Serialize)]
pub struct QuestionPageResponse {
    pub questions: Vec<Question>,
    pub total_questions: i64,
    pub categories: Vec<Category>,
    pub current_category: Option<Category>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub current_category: Option<Category>,
}

/// GET /questions?page=N
async fn list_questions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Success<QuestionPageResponse>, ApiError> {
    let page = Page::from(params);
    let result = state.trivia.questions_page(page).await?;
    if result.is_past_end() {
        return Err(ApiError::not_found("page", result.page));
    }

    let categories = state.trivia.categories().await?;
    Ok(Success::new(QuestionPageResponse {
        questions: result.items,
        total_questions: result.total,
        categories,
        current_category: None,
    }))
}

/// POST /questions
async fn create_question(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> Result<Success<Created>, ApiError> {
    let question = NewQuestion::parse(&input)?;
    let question = state.trivia.create_question(question).await?;
    tracing::info!(question_id = question.id, category_id = question.category_id(), "question created");
    Ok(Success::new(Created {
        created: question.id,
    }))
}

/// DELETE /questions/{id}
async fn delete_question(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> Result<Success<Deleted>, ApiError> {
    state.trivia.delete_question(id).await?;
    Ok(Success::new(Deleted { deleted: id }))
}

/// POST /questions/search
async fn search_questions(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<Map<String, Value>>,
) -> Result<Success<SearchResponse>, ApiError> {
    let term = search_term(&input)?;
    let questions = state.trivia.search_questions(&term).await?;
    Ok(Success::new(SearchResponse {
        total_questions: questions.len(),
        questions,
        current_category: None,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/search", post(search_questions))
        .route("/questions/{id}", delete(delete_question))
}
