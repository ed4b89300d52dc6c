//! Trivia categories

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::validation::{validate, FieldRule, ValidationError};

pub const CATEGORY_FIELDS: &[FieldRule] = &[FieldRule::text("type", 120)];

/// A question category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Category {
    pub id: i32,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

/// Validated category label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabel(String);

impl CategoryLabel {
    pub fn parse(input: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut fields = validate(input, CATEGORY_FIELDS)?;
        Ok(Self(fields.text("type")?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
