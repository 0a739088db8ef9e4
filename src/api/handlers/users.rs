//! `/api/whoami` and `/api/users` - the caller and the identity directory.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::extract::ApiPath;
use crate::api::{ApiError, AppState, Caller};
use crate::error::InventoryError;
use crate::identity::{same_subject, IdentityDirectory, UserProfile};
use crate::model::Inventory;
use crate::store::InventoryStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WhoAmI {
    pub user_id: String,
    pub display_name: String,
}

pub(crate) async fn whoami<S, D>(caller: Caller) -> Json<WhoAmI>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    Json(WhoAmI {
        user_id: caller.user_id().to_string(),
        display_name: caller.session().display_name().to_string(),
    })
}

/// `GET /api/users` - 503 when the directory cannot be reached.
#[tracing::instrument(skip_all, fields(caller = %caller.user_id()))]
pub(crate) async fn list_profiles<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
) -> Result<Json<Vec<UserProfile>>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    match state.directory().list_profiles(Some(caller.bearer())).await {
        Ok(profiles) => Ok(Json(profiles)),
        Err(err) => {
            tracing::warn!(error = %err, "listing users failed");
            Err(ApiError::DirectoryUnavailable(err))
        }
    }
}

/// `GET /api/users/:user_id/profile` - only the caller's own profile.
#[tracing::instrument(skip_all, fields(caller = %caller.user_id()))]
pub(crate) async fn profile<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath(user_id): ApiPath<String>,
) -> Result<Json<UserProfile>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    if !same_subject(&user_id, caller.user_id()) {
        return Err(ApiError::forbidden("profiles of other users are not visible"));
    }

    let not_found = || ApiError::Inventory(InventoryError::NotFound(format!("profile {}", user_id)));
    match state
        .directory()
        .get_profile(&user_id, Some(caller.bearer()))
        .await
    {
        Ok(Some(profile)) => Ok(Json(profile)),
        Ok(None) => Err(not_found()),
        Err(err) => {
            tracing::warn!(error = %err, "profile lookup failed");
            Err(not_found())
        }
    }
}

/// `GET /api/users/:user_id/inventories` - only the caller's own.
pub(crate) async fn inventories<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath(user_id): ApiPath<String>,
) -> Result<Json<Vec<Inventory>>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    if !same_subject(&user_id, caller.user_id()) {
        return Err(ApiError::forbidden("inventories of other users are not visible"));
    }
    Ok(Json(state.catalog().list_user_inventories(caller.user_id())?))
}
