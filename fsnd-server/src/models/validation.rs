//! Field validation for submitted records
//!
//! Every create/update endpoint declares its accepted fields as a
//! `&'static [FieldRule]`. [`validate`] walks the rules in declaration
//! order against the raw JSON object and either returns the sanitized
//! [`Fields`] or the first [`ValidationError`].

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

/// Loose http(s) URL check, in the spirit of the WTForms `URL()` validator.
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("invalid url regex")
});

/// North American phone number, optionally with a country prefix.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+[0-9]{1,3}[-. ]?)?\(?[0-9]{3}\)?[-. ]?[0-9]{3}[-. ]?[0-9]{4}$")
        .expect("invalid phone regex")
});

/// US state and DC postal codes.
pub const STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH",
    "OK", "OR", "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

/// Naive timestamp format accepted alongside RFC 3339.
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Validation error for submitted fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required key absent or null
    Missing { field: &'static str },

    /// Field is empty (after trimming) when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Numeric field didn't parse as an integer
    NotAnInteger { field: &'static str },

    /// Integer outside its allowed range
    OutOfRange { field: &'static str, min: i64, max: i64 },

    /// Value has the wrong shape or format
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Id doesn't point at an existing record
    UnknownReference { field: &'static str, id: i64 },

    /// Value must be unique and is already taken
    Duplicate { field: &'static str, value: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::NotAnInteger { field }
            | Self::OutOfRange { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::UnknownReference { field, .. }
            | Self::Duplicate { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { field } => write!(f, "{} is required", field),
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::NotAnInteger { field } => write!(f, "{} must be an integer", field),
            Self::OutOfRange { field, min, max } => {
                write!(f, "{} must be between {} and {}", field, min, max)
            }
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
            Self::UnknownReference { field, id } => {
                write!(f, "{}: no record with id {}", field, id)
            }
            Self::Duplicate { field, value } => {
                write!(f, "{} '{}' already exists", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Shape and bounds of one accepted field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text { max_len: usize },
    Url { max_len: usize },
    Phone { max_len: usize },
    State { choices: &'static [&'static str] },
    TextList { max_item_len: usize },
    Integer { min: i64, max: i64 },
    Flag,
    Timestamp,
}

/// One entry of a form's field list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldRule {
    pub name: &'static str,
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldRule {
    pub const fn text(name: &'static str, max_len: usize) -> Self {
        Self::new(name, FieldKind::Text { max_len })
    }

    pub const fn url(name: &'static str, max_len: usize) -> Self {
        Self::new(name, FieldKind::Url { max_len })
    }

    pub const fn phone(name: &'static str, max_len: usize) -> Self {
        Self::new(name, FieldKind::Phone { max_len })
    }

    /// Two-letter state code, stored uppercased.
    pub const fn state(name: &'static str) -> Self {
        Self::new(
            name,
            FieldKind::State {
                choices: STATE_CODES,
            },
        )
    }

    pub const fn text_list(name: &'static str, max_item_len: usize) -> Self {
        Self::new(name, FieldKind::TextList { max_item_len })
    }

    pub const fn integer(name: &'static str, min: i64, max: i64) -> Self {
        Self::new(name, FieldKind::Integer { min, max })
    }

    /// Flags are never required; absent means `false`.
    pub const fn flag(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            kind: FieldKind::Flag,
        }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    /// Mark the field optional.
    pub const fn optional(self) -> Self {
        Self {
            name: self.name,
            required: false,
            kind: self.kind,
        }
    }

    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: true,
            kind,
        }
    }
}

/// A sanitized field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Integer(i64),
    Flag(bool),
    Timestamp(DateTime<Utc>),
}

/// Sanitized values keyed by field name.
///
/// Accessors take the value out; optional fields that were absent or
/// blank come back as `None`.
#[derive(Debug, Default)]
pub struct Fields {
    values: HashMap<&'static str, FieldValue>,
}

impl Fields {
    pub fn text(&mut self, field: &'static str) -> Result<String, ValidationError> {
        self.opt_text(field)
            .ok_or(ValidationError::Missing { field })
    }

    pub fn opt_text(&mut self, field: &'static str) -> Option<String> {
        match self.values.remove(field) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn list(&mut self, field: &'static str) -> Vec<String> {
        match self.values.remove(field) {
            Some(FieldValue::List(items)) => items,
            _ => Vec::new(),
        }
    }

    pub fn integer(&mut self, field: &'static str) -> Result<i64, ValidationError> {
        match self.values.remove(field) {
            Some(FieldValue::Integer(n)) => Ok(n),
            _ => Err(ValidationError::Missing { field }),
        }
    }

    /// Integer narrowed to `i32`. Values outside `i32` are out of range.
    pub fn integer_i32(&mut self, field: &'static str) -> Result<i32, ValidationError> {
        let n = self.integer(field)?;
        i32::try_from(n).map_err(|_| ValidationError::OutOfRange {
            field,
            min: i64::from(i32::MIN),
            max: i64::from(i32::MAX),
        })
    }

    /// Id of a referenced record.
    pub fn id(&mut self, field: &'static str) -> Result<i32, ValidationError> {
        self.integer_i32(field)
    }

    pub fn flag(&mut self, field: &'static str) -> bool {
        matches!(self.values.remove(field), Some(FieldValue::Flag(true)))
    }

    pub fn timestamp(&mut self, field: &'static str) -> Result<DateTime<Utc>, ValidationError> {
        match self.values.remove(field) {
            Some(FieldValue::Timestamp(ts)) => Ok(ts),
            _ => Err(ValidationError::Missing { field }),
        }
    }
}

/// Validate `input` against `rules`, stopping at the first failure.
///
/// Keys not named by a rule are ignored.
pub fn validate(input: &Map<String, Value>, rules: &[FieldRule]) -> Result<Fields, ValidationError> {
    let mut fields = Fields::default();

    for rule in rules {
        let raw = input.get(rule.name).filter(|v| !v.is_null());
        let value = match raw {
            Some(raw) => sanitize(rule, raw)?,
            None => None,
        };

        match value {
            Some(value) => {
                fields.values.insert(rule.name, value);
            }
            None if rule.required => {
                return Err(match raw {
                    Some(_) => ValidationError::Empty { field: rule.name },
                    None => ValidationError::Missing { field: rule.name },
                });
            }
            None => {}
        }
    }

    Ok(fields)
}

/// Sanitize one present value. `Ok(None)` means "blank".
fn sanitize(rule: &FieldRule, raw: &Value) -> Result<Option<FieldValue>, ValidationError> {
    let field = rule.name;

    match rule.kind {
        FieldKind::Text { max_len } => {
            let Some(text) = trimmed(field, raw)? else {
                return Ok(None);
            };
            check_len(field, &text, max_len)?;
            Ok(Some(FieldValue::Text(text)))
        }
        FieldKind::Url { max_len } => {
            let Some(text) = trimmed(field, raw)? else {
                return Ok(None);
            };
            check_len(field, &text, max_len)?;
            if !URL_RE.is_match(&text) {
                return Err(ValidationError::InvalidFormat {
                    field,
                    reason: "must be a valid http(s) URL",
                });
            }
            Ok(Some(FieldValue::Text(text)))
        }
        FieldKind::Phone { max_len } => {
            let Some(text) = trimmed(field, raw)? else {
                return Ok(None);
            };
            check_len(field, &text, max_len)?;
            if !PHONE_RE.is_match(&text) {
                return Err(ValidationError::InvalidFormat {
                    field,
                    reason: "must be a phone number like 123-123-1234",
                });
            }
            Ok(Some(FieldValue::Text(text)))
        }
        FieldKind::State { choices } => {
            let Some(text) = trimmed(field, raw)? else {
                return Ok(None);
            };
            let code = text.to_ascii_uppercase();
            if !choices.contains(&code.as_str()) {
                return Err(ValidationError::InvalidFormat {
                    field,
                    reason: "must be a two-letter US state code",
                });
            }
            Ok(Some(FieldValue::Text(code)))
        }
        FieldKind::TextList { max_item_len } => {
            let items: Vec<&Value> = match raw {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };

            let mut list = Vec::with_capacity(items.len());
            for item in items {
                let Value::String(s) = item else {
                    return Err(ValidationError::InvalidFormat {
                        field,
                        reason: "must be a list of strings",
                    });
                };
                let s = s.trim();
                if s.is_empty() {
                    continue;
                }
                check_len(field, s, max_item_len)?;
                list.push(s.to_owned());
            }

            Ok((!list.is_empty()).then_some(FieldValue::List(list)))
        }
        FieldKind::Integer { min, max } => {
            let n = match raw {
                Value::Number(n) => n.as_i64().ok_or(ValidationError::NotAnInteger { field })?,
                Value::String(s) if s.trim().is_empty() => return Ok(None),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ValidationError::NotAnInteger { field })?,
                _ => return Err(ValidationError::NotAnInteger { field }),
            };

            if n < min || n > max {
                return Err(ValidationError::OutOfRange { field, min, max });
            }
            Ok(Some(FieldValue::Integer(n)))
        }
        FieldKind::Flag => {
            let flag = match raw {
                Value::Bool(b) => *b,
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "y" | "yes" | "on" | "true" | "1" => true,
                    "n" | "no" | "off" | "false" | "0" | "" => false,
                    _ => {
                        return Err(ValidationError::InvalidFormat {
                            field,
                            reason: "must be a boolean",
                        })
                    }
                },
                _ => {
                    return Err(ValidationError::InvalidFormat {
                        field,
                        reason: "must be a boolean",
                    })
                }
            };
            Ok(Some(FieldValue::Flag(flag)))
        }
        FieldKind::Timestamp => {
            let Some(text) = trimmed(field, raw)? else {
                return Ok(None);
            };
            parse_timestamp(&text)
                .map(|ts| Some(FieldValue::Timestamp(ts)))
                .ok_or(ValidationError::InvalidFormat {
                    field,
                    reason: "must be an RFC 3339 or 'YYYY-MM-DD HH:MM:SS' timestamp",
                })
        }
    }
}

fn trimmed(field: &'static str, raw: &Value) -> Result<Option<String>, ValidationError> {
    match raw {
        Value::String(s) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_owned()))
        }
        _ => Err(ValidationError::InvalidFormat {
            field,
            reason: "must be a string",
        }),
    }
}

fn check_len(field: &'static str, s: &str, max: usize) -> Result<(), ValidationError> {
    if s.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, NAIVE_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
