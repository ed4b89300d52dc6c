//! `Authorization: Bearer <token>` parsing

use super::AuthError;

/// Raw bearer token taken from the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Parse an `Authorization` header value.
    ///
    /// The scheme is matched case-insensitively and the value must have
    /// exactly two whitespace-separated parts.
    pub fn parse(header: Option<&str>) -> Result<Self, AuthError> {
        let header = header.ok_or(AuthError::MissingHeader)?;
        let parts: Vec<&str> = header.split_whitespace().collect();

        match parts.as_slice() {
            [] => Err(AuthError::MissingHeader),
            [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(
                AuthError::MalformedHeader("Authorization header must start with \"Bearer\"."),
            ),
            [_] => Err(AuthError::MalformedHeader("Token not found.")),
            [_, token] => Ok(Self((*token).to_owned())),
            _ => Err(AuthError::MalformedHeader(
                "Authorization header must be bearer token.",
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
