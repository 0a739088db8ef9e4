//! Session - the verified identity of the caller for one request.

use super::verifier::Claims;

/// Verified claims of the incoming request, plus the bearer token they came
/// from (forwarded to the identity provider for profile lookups).
///
/// Build one with [`Session::from_claims`] after [`TokenVerifier::verify`]
/// succeeds; never from a client-supplied user id.
///
/// [`TokenVerifier::verify`]: super::TokenVerifier::verify
#[derive(Debug, Clone)]
pub struct Session {
    claims: Claims,
    bearer: String,
}

impl Session {
    /// Create a session from verified claims and the raw token.
    pub fn from_claims(claims: Claims, bearer: impl Into<String>) -> Self {
        Self {
            claims,
            bearer: bearer.into(),
        }
    }

    /// The caller's subject (`sub` claim).
    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }

    /// Best display name carried by the token itself.
    pub fn display_name(&self) -> &str {
        self.claims
            .name
            .as_deref()
            .or(self.claims.preferred_username.as_deref())
            .or(self.claims.email.as_deref())
            .unwrap_or(&self.claims.sub)
    }

    /// The raw bearer token (without the `Bearer ` prefix).
    pub fn bearer(&self) -> &str {
        &self.bearer
    }

    /// Get all verified claims.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}
