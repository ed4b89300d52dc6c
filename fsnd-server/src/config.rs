//! Auth0 settings read from the environment

use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Default key-set cache lifetime in seconds
pub const DEFAULT_JWKS_TTL_SECS: u64 = 600;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is set but {missing} is not; set both or neither")]
    Incomplete {
        var: &'static str,
        missing: &'static str,
    },

    #[error("unsupported algorithm in AUTH0_ALGORITHMS: '{0}'")]
    Algorithm(String),

    #[error("invalid JWKS_CACHE_TTL_SECS: '{0}'")]
    CacheTtl(String),
}

/// Token verification settings for the guarded coffee routes
#[derive(Debug, Clone, PartialEq)]
pub struct AuthConfig {
    pub domain: String,
    pub audience: String,
    pub algorithms: Vec<Algorithm>,
    pub cache_ttl: Duration,
}

impl AuthConfig {
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            cache_ttl: Duration::from_secs(DEFAULT_JWKS_TTL_SECS),
        }
    }

    /// `None` when neither `AUTH0_DOMAIN` nor `API_AUDIENCE` is set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let (domain, audience) = match (get("AUTH0_DOMAIN"), get("API_AUDIENCE")) {
            (None, None) => return Ok(None),
            (Some(_), None) => {
                return Err(ConfigError::Incomplete {
                    var: "AUTH0_DOMAIN",
                    missing: "API_AUDIENCE",
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete {
                    var: "API_AUDIENCE",
                    missing: "AUTH0_DOMAIN",
                })
            }
            (Some(domain), Some(audience)) => (domain, audience),
        };

        let mut config = Self::new(domain.trim().trim_end_matches('/'), audience.trim());

        if let Some(raw) = get("AUTH0_ALGORITHMS") {
            config.algorithms = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Algorithm::from_str(s).map_err(|_| ConfigError::Algorithm(s.to_owned())))
                .collect::<Result<_, _>>()?;
        }

        if let Some(raw) = get("JWKS_CACHE_TTL_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::CacheTtl(raw.clone()))?;
            config.cache_ttl = Duration::from_secs(secs);
        }

        Ok(Some(config))
    }

    /// Expected `iss` claim.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_url(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.domain)
    }
}
