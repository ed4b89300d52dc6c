//! JSON Web Key Sets and the in-process key cache

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::AuthError;

pub(crate) const NO_MATCHING_KEY: &str = "Unable to find the appropriate key.";

/// One published key. Only the members needed for `RSA` and `oct` keys are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,
}

impl JsonWebKey {
    /// Symmetric key holding `secret`.
    pub fn oct(kid: impl Into<String>, secret: &[u8]) -> Self {
        Self {
            kty: "oct".into(),
            kid: Some(kid.into()),
            alg: None,
            usage: Some("sig".into()),
            n: None,
            e: None,
            k: Some(URL_SAFE_NO_PAD.encode(secret)),
        }
    }

    pub fn decoding_key(&self) -> Result<DecodingKey, AuthError> {
        match self.kty.as_str() {
            "RSA" => {
                let (Some(n), Some(e)) = (&self.n, &self.e) else {
                    return Err(AuthError::InvalidHeader(NO_MATCHING_KEY));
                };
                DecodingKey::from_rsa_components(n, e)
                    .map_err(|_| AuthError::InvalidHeader(NO_MATCHING_KEY))
            }
            "oct" => {
                let secret = self
                    .k
                    .as_deref()
                    .and_then(|k| URL_SAFE_NO_PAD.decode(k.trim_end_matches('=')).ok())
                    .ok_or(AuthError::InvalidHeader(NO_MATCHING_KEY))?;
                Ok(DecodingKey::from_secret(&secret))
            }
            _ => Err(AuthError::InvalidHeader(NO_MATCHING_KEY)),
        }
    }
}

/// `{"keys": [...]}` document served at `/.well-known/jwks.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet {
    pub keys: Vec<JsonWebKey>,
}

impl KeySet {
    pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }
}

/// Where key sets come from
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<KeySet, AuthError>;
}

/// Fetches the key set over HTTPS
#[derive(Debug, Clone)]
pub struct HttpKeySource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self) -> Result<KeySet, AuthError> {
        tracing::debug!(url = %self.url, "fetching key set");

        let response = self
            .client
            .get(&self.url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        response
            .json::<KeySet>()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))
    }
}

/// Fixed key set that counts how often it is fetched
#[derive(Debug, Default)]
pub struct StaticKeySource {
    keys: KeySet,
    fetches: AtomicUsize,
}

impl StaticKeySource {
    pub fn new(keys: KeySet) -> Self {
        Self {
            keys,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch(&self) -> Result<KeySet, AuthError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.keys.clone())
    }
}

#[derive(Debug)]
struct CachedKeys {
    keys: KeySet,
    fetched_at: Instant,
}

/// Shortest gap between refetches caused by an unknown `kid`
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Key set cached for `ttl`.
///
/// An empty or stale cache is refetched. A `kid` missing from a fresh
/// cache refetches only when the last fetch is at least
/// [`MIN_REFRESH_INTERVAL`] old. Fetches run under the write lock, so
/// concurrent misses share one fetch.
pub struct KeyCache {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    min_refresh: Duration,
    cached: RwLock<Option<CachedKeys>>,
}

enum Lookup {
    Hit(JsonWebKey),
    /// Fresh key set without the kid, fetched too recently to refetch
    Unknown,
    Miss,
}

impl KeyCache {
    pub fn new(source: Arc<dyn KeySource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            min_refresh: MIN_REFRESH_INTERVAL.min(ttl),
            cached: RwLock::new(None),
        }
    }

    fn lookup(&self, cached: Option<&CachedKeys>, kid: &str) -> Lookup {
        let Some(entry) = cached else {
            return Lookup::Miss;
        };
        let age = entry.fetched_at.elapsed();
        if age >= self.ttl {
            return Lookup::Miss;
        }
        match entry.keys.find(kid) {
            Some(key) => Lookup::Hit(key.clone()),
            None if age < self.min_refresh => Lookup::Unknown,
            None => Lookup::Miss,
        }
    }

    pub async fn key(&self, kid: &str) -> Result<JsonWebKey, AuthError> {
        match self.lookup(self.cached.read().await.as_ref(), kid) {
            Lookup::Hit(key) => return Ok(key),
            Lookup::Unknown => return Err(AuthError::InvalidHeader(NO_MATCHING_KEY)),
            Lookup::Miss => {}
        }

        let mut cached = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock.
        match self.lookup(cached.as_ref(), kid) {
            Lookup::Hit(key) => return Ok(key),
            Lookup::Unknown => return Err(AuthError::InvalidHeader(NO_MATCHING_KEY)),
            Lookup::Miss => {}
        }

        let keys = self.source.fetch().await?;
        tracing::debug!(keys = keys.keys.len(), "key set refreshed");

        let found = keys.find(kid).cloned();
        *cached = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        found.ok_or(AuthError::InvalidHeader(NO_MATCHING_KEY))
    }
}
