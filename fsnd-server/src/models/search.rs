//! Search terms shared by the venue, artist and question searches

use serde_json::{Map, Value};

use super::validation::{validate, FieldRule, ValidationError};

const SEARCH_FIELDS: &[FieldRule] = &[FieldRule::text("search_term", 300)];

/// Trimmed, non-empty search term.
///
/// Accepts `search_term` or the frontend's `searchTerm`.
pub fn search_term(input: &Map<String, Value>) -> Result<String, ValidationError> {
    let mut normalized = Map::new();
    if let Some(term) = input.get("search_term").or_else(|| input.get("searchTerm")) {
        normalized.insert("search_term".to_owned(), term.clone());
    }
    let mut fields = validate(&normalized, SEARCH_FIELDS)?;
    fields.text("search_term")
}

/// Case-insensitive substring match.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
