//! Trivia questions and quiz play

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::category::Category;
use super::validation::{validate, FieldRule, ValidationError};

/// Maximum length of question and answer text
pub const MAX_TEXT_LEN: usize = 300;

pub const QUESTION_FIELDS: &[FieldRule] = &[
    FieldRule::text("question", MAX_TEXT_LEN),
    FieldRule::text("answer", MAX_TEXT_LEN),
    FieldRule::integer("difficulty", 1, 5),
    FieldRule::integer("category", 1, i32::MAX as i64),
];

/// A stored question with its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: i32,
    pub question: String,
    pub answer: String,
    pub difficulty: i32,
    pub category: Category,
}

impl Question {
    pub fn category_id(&self) -> i32 {
        self.category.id
    }
}

/// Validated question submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub difficulty: i32,
    pub category_id: i32,
}

impl NewQuestion {
    pub fn parse(input: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut fields = validate(input, QUESTION_FIELDS)?;
        Ok(Self {
            question: fields.text("question")?,
            answer: fields.text("answer")?,
            difficulty: fields.integer_i32("difficulty")?,
            category_id: fields.id("category")?,
        })
    }

    /// `category` must be the category named by `category_id`.
    pub fn into_question(self, id: i32, category: Category) -> Question {
        Question {
            id,
            question: self.question,
            answer: self.answer,
            difficulty: self.difficulty,
            category,
        }
    }
}

/// `POST /quizzes` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizRequest {
    #[serde(default)]
    pub previous_questions: Vec<i32>,
    #[serde(default)]
    pub quiz_category: Option<Value>,
}

impl QuizRequest {
    /// Category to draw from; `None` means all categories.
    ///
    /// Accepts a bare id, a numeric string, or an object with an `id`
    /// key. Id 0 means all categories.
    pub fn category_filter(&self) -> Result<Option<i32>, ValidationError> {
        const FIELD: &str = "quiz_category";

        let raw = match &self.quiz_category {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(obj)) => obj.get("id").cloned().unwrap_or(Value::Null),
            Some(other) => other.clone(),
        };

        let id = match raw {
            Value::Null => return Ok(None),
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or(ValidationError::NotAnInteger { field: FIELD })?;

        match i32::try_from(id) {
            Ok(0) => Ok(None),
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(ValidationError::OutOfRange {
                field: FIELD,
                min: 0,
                max: i64::from(i32::MAX),
            }),
        }
    }
}

/// Pick uniformly among `candidates`, skipping any already seen.
///
/// `None` once every candidate has been asked.
pub fn next_question<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &[i32],
    rng: &mut R,
) -> Option<Question> {
    let unseen: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !previous.contains(&q.id))
        .collect();
    unseen.choose(rng).cloned()
}
