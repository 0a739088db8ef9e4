//! Bearer token verification.
//!
//! Published keys are cached. A token signed with a `kid` the cache does not
//! know triggers one reload of the provider's JWKS, at most once per refresh
//! interval, so key rotation at the provider does not need a restart.

use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::session::Session;

/// Minimum time between two JWKS reloads.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Claims read from a verified access token. Issuer and audience are
/// validated but not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

enum VerificationKeys {
    /// Shared HS256 secret.
    Secret(DecodingKey),
    /// Provider's published signing keys, selected by `kid`.
    Published(PublishedKeys),
}

struct PublishedKeys {
    keys: RwLock<JwkSet>,
    source: Option<KeySource>,
}

/// Where the published keys are reloaded from.
struct KeySource {
    http: reqwest::Client,
    jwks_uri: String,
    refresh_interval: Duration,
    last_fetch: Mutex<Option<Instant>>,
}

#[derive(Deserialize)]
struct OpenIdConfiguration {
    jwks_uri: String,
}

/// Verifies bearer JWTs against one issuer and audience.
pub struct TokenVerifier {
    issuer: String,
    audience: String,
    keys: VerificationKeys,
}

impl TokenVerifier {
    /// Verify HS256 tokens signed with a shared secret.
    pub fn with_secret(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        secret: &[u8],
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            keys: VerificationKeys::Secret(DecodingKey::from_secret(secret)),
        }
    }

    /// Verify asymmetric tokens against a fixed key set. Never reloads.
    pub fn with_jwks(issuer: impl Into<String>, audience: impl Into<String>, jwks: JwkSet) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            keys: VerificationKeys::Published(PublishedKeys {
                keys: RwLock::new(jwks),
                source: None,
            }),
        }
    }

    /// Fetch the provider's key set through its OpenID discovery document.
    /// The key set is reloaded from the same `jwks_uri` when an unknown `kid`
    /// shows up.
    ///
    /// `authority` is the realm URL (e.g. `https://auth.example.com/realms/home`).
    #[tracing::instrument(skip(http, issuer, audience))]
    pub async fn discover(
        http: &reqwest::Client,
        authority: &str,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let discovery_url = format!(
            "{}/.well-known/openid-configuration",
            authority.trim_end_matches('/')
        );
        let configuration: OpenIdConfiguration = http
            .get(&discovery_url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(keys_unavailable)?
            .json()
            .await
            .map_err(keys_unavailable)?;

        let jwks = fetch_jwks(http, &configuration.jwks_uri).await?;
        tracing::info!(keys = jwks.keys.len(), jwks_uri = %configuration.jwks_uri, "loaded signing keys");

        Ok(Self {
            issuer: issuer.into(),
            audience: audience.into(),
            keys: VerificationKeys::Published(PublishedKeys {
                keys: RwLock::new(jwks),
                source: Some(KeySource {
                    http: http.clone(),
                    jwks_uri: configuration.jwks_uri,
                    refresh_interval: DEFAULT_REFRESH_INTERVAL,
                    last_fetch: Mutex::new(Some(Instant::now())),
                }),
            }),
        })
    }

    /// Change how often the published keys may be reloaded.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        if let VerificationKeys::Published(PublishedKeys {
            source: Some(source),
            ..
        }) = &mut self.keys
        {
            source.refresh_interval = interval;
        }
        self
    }

    /// Verify a raw token and return its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let (key, algorithm) = match &self.keys {
            VerificationKeys::Secret(key) => (key.clone(), Algorithm::HS256),
            VerificationKeys::Published(published) => {
                let header = decode_header(token)?;
                if matches!(
                    header.alg,
                    Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
                ) {
                    return Err(AuthError::Invalid(
                        "symmetric algorithm not accepted with published keys".into(),
                    ));
                }
                let kid = header
                    .kid
                    .ok_or_else(|| AuthError::Invalid("missing kid".into()))?;
                (published.key_for(&kid).await?, header.alg)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);

        let claims = decode::<Claims>(token, &key, &validation)?.claims;
        if claims.sub.trim().is_empty() {
            return Err(AuthError::Invalid("empty subject".into()));
        }
        Ok(claims)
    }

    /// Verify the value of an `Authorization` header and build the session.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Session, AuthError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(AuthError::MissingCredential)?;
        let claims = self.verify(token).await?;
        Ok(Session::from_claims(claims, token))
    }
}

impl PublishedKeys {
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.cached(kid)? {
            return Ok(key);
        }

        let unknown = || AuthError::Invalid(format!("unknown kid {}", kid));
        let Some(source) = &self.source else {
            return Err(unknown());
        };
        if !source.claim_refresh()? {
            tracing::debug!(kid, "unknown kid, key reload not due yet");
            return Err(unknown());
        }

        let jwks = fetch_jwks(&source.http, &source.jwks_uri).await?;
        tracing::info!(kid, keys = jwks.keys.len(), "reloaded signing keys");
        *self.keys.write().map_err(|_| cache_poisoned())? = jwks;

        self.cached(kid)?.ok_or_else(unknown)
    }

    fn cached(&self, kid: &str) -> Result<Option<DecodingKey>, AuthError> {
        let keys = self.keys.read().map_err(|_| cache_poisoned())?;
        match keys.find(kid) {
            Some(jwk) => Ok(Some(DecodingKey::from_jwk(jwk)?)),
            None => Ok(None),
        }
    }
}

impl KeySource {
    /// Take the reload slot if the refresh interval has passed.
    fn claim_refresh(&self) -> Result<bool, AuthError> {
        let mut last = self.last_fetch.lock().map_err(|_| cache_poisoned())?;
        let due = last.map_or(true, |at| at.elapsed() >= self.refresh_interval);
        if due {
            *last = Some(Instant::now());
        }
        Ok(due)
    }
}

async fn fetch_jwks(http: &reqwest::Client, jwks_uri: &str) -> Result<JwkSet, AuthError> {
    http.get(jwks_uri)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(keys_unavailable)?
        .json()
        .await
        .map_err(keys_unavailable)
}

fn keys_unavailable(err: reqwest::Error) -> AuthError {
    AuthError::KeysUnavailable(err.to_string())
}

fn cache_poisoned() -> AuthError {
    AuthError::KeysUnavailable("key cache lock poisoned".into())
}

/// Strip the `Bearer` scheme (case-insensitive) from an `Authorization` value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
