use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::ApiError;
use super::AppState;
use crate::identity::{IdentityDirectory, Session};
use crate::store::InventoryStore;

/// The verified caller of a request.
///
/// Extracting it checks the `Authorization: Bearer` token; handlers that
/// take a `Caller` answer 401 to anonymous or invalid requests.
#[derive(Debug, Clone)]
pub struct Caller(pub Session);

impl Caller {
    pub fn user_id(&self) -> &str {
        self.0.user_id()
    }

    pub fn bearer(&self) -> &str {
        self.0.bearer()
    }

    pub fn session(&self) -> &Session {
        &self.0
    }
}

#[axum::async_trait]
impl<S, D> FromRequestParts<AppState<S, D>> for Caller
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S, D>,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match state.verifier().authenticate(authorization).await {
            Ok(session) => Ok(Caller(session)),
            Err(err) => {
                tracing::debug!(error = %err, path = %parts.uri.path(), "authentication failed");
                Err(ApiError::Auth(err))
            }
        }
    }
}
