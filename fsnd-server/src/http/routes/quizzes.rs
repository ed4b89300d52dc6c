//! Quiz play

use std::sync::Arc;

use axum::{extract::State, routing::post, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::http::response::Success;
use crate::http::server::AppState;
use crate::models::question::next_question;
use crate::models::{Question, QuizRequest};

#[derive(Serialize)]
pub struct QuizResponse {
    /// `null` once the category is exhausted
    pub question: Option<Question>,
}

/// POST /quizzes - a random question not in `previous_questions`
async fn next_quiz_question(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<QuizRequest>,
) -> Result<Success<QuizResponse>, ApiError> {
    let category = request.category_filter()?;
    let candidates = state
        .trivia
        .quiz_candidates(category, &request.previous_questions)
        .await?;

    let question = next_question(candidates, &request.previous_questions, &mut rand::thread_rng());
    Ok(Success::new(QuizResponse { question }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/quizzes", post(next_quiz_question))
}
