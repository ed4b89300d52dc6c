//! Bearer-token authorization against a published key set
//!
//! Tokens are RS256 (or configured) JWTs issued by Auth0. The signing key
//! is selected by the token header's `kid`, then audience, issuer and
//! expiry are checked before the `permissions` claim is consulted.

mod bearer;
pub mod jwks;

use std::collections::HashMap;
use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};

pub use bearer::BearerToken;
pub use jwks::{HttpKeySource, JsonWebKey, KeyCache, KeySet, KeySource, StaticKeySource};

use crate::config::AuthConfig;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingHeader,

    #[error("{0}")]
    MalformedHeader(&'static str),

    #[error("{0}")]
    InvalidHeader(&'static str),

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Unable to parse authentication token.")]
    DecodeFailure,

    #[error("Permissions not included in JWT.")]
    PermissionsNotFound,

    #[error("Permission not found.")]
    PermissionDenied,

    #[error("key set unavailable: {0}")]
    KeySetUnavailable(String),
}

impl AuthError {
    /// Stable machine-readable tag for the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::MalformedHeader(_)
            | AuthError::InvalidHeader(_)
            | AuthError::DecodeFailure => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims | AuthError::PermissionsNotFound => "invalid_claims",
            AuthError::PermissionDenied => "unauthorized",
            AuthError::KeySetUnavailable(_) => "key_set_unavailable",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
            _ => AuthError::DecodeFailure,
        }
    }
}

/// Verified token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Require `permission` among the token's permissions.
pub fn check_permission(claims: &Claims, permission: &str) -> Result<(), AuthError> {
    let permissions = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsNotFound)?;

    if permissions.iter().any(|p| p == permission) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}

/// Verifies bearer tokens and checks permissions
pub struct Authorizer {
    keys: KeyCache,
    audience: String,
    issuer: String,
    algorithms: Vec<Algorithm>,
}

impl Authorizer {
    pub fn new(config: &AuthConfig, source: Arc<dyn KeySource>) -> Self {
        Self {
            keys: KeyCache::new(source, config.cache_ttl),
            audience: config.audience.clone(),
            issuer: config.issuer(),
            algorithms: config.algorithms.clone(),
        }
    }

    /// Authorizer fetching keys from the tenant's JWKS endpoint.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config, Arc::new(HttpKeySource::new(config.jwks_url())))
    }

    /// Verify signature and registered claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::DecodeFailure)?;
        let kid = header
            .kid
            .ok_or(AuthError::InvalidHeader("Authorization malformed."))?;

        let jwk = self.keys.key(&kid).await?;
        let key = jwk.decoding_key()?;

        let mut validation = Validation::new(header.alg);
        validation.algorithms = self.algorithms.clone();
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<Claims>(token, &key, &validation)?;
        Ok(data.claims)
    }

    /// Verify `token` and require `permission`.
    pub async fn authorize(
        &self,
        permission: &str,
        token: &BearerToken,
    ) -> Result<Claims, AuthError> {
        let claims = self.verify(token.as_str()).await?;
        check_permission(&claims, permission)?;
        Ok(claims)
    }
}
