//! `/api/inventory/:id/members` and `/api/inventory/:id/owner`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::extract::{ApiJson, ApiPath};
use crate::api::{ApiError, AppState, Caller};
use crate::identity::IdentityDirectory;
use crate::model::{Inventory, InventoryMember};
use crate::store::InventoryStore;

/// Body naming a user: `{ "userId": "..." }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserRef {
    #[serde(default)]
    pub user_id: String,
}

pub(crate) async fn list<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<InventoryMember>>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    Ok(Json(state.catalog().list_members(id, caller.user_id())?))
}

pub(crate) async fn add<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UserRef>,
) -> Result<(StatusCode, Json<InventoryMember>), ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    let member = state
        .membership()
        .add_member(id, &body.user_id, caller.user_id())?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// `DELETE /api/inventory/:id/members/:user_id` - leave, or owner removes.
pub(crate) async fn remove<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath((id, user_id)): ApiPath<(Uuid, String)>,
) -> Result<StatusCode, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    state
        .membership()
        .remove_member(id, &user_id, caller.user_id())?;
    Ok(StatusCode::OK)
}

pub(crate) async fn transfer_owner<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UserRef>,
) -> Result<Json<Inventory>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    let inventory = state
        .membership()
        .transfer_ownership(id, &body.user_id, caller.user_id())?;
    Ok(Json(inventory))
}
