//! `/api/inventory` - inventories and their tracked products.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::extract::{ApiJson, ApiPath};
use crate::api::{ApiError, AppState, Caller};
use crate::catalog::{InventoryUpdate, LinkAmounts, NewInventoryProduct};
use crate::identity::IdentityDirectory;
use crate::membership::BulkRemovalReport;
use crate::model::{Inventory, InventoryProduct, InventoryProductView};
use crate::store::InventoryStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateInventory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BulkRemove {
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

/// `POST /api/inventory` - the caller becomes owner and first member.
pub(crate) async fn create<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiJson(body): ApiJson<CreateInventory>,
) -> Result<(StatusCode, Json<Inventory>), ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    let inventory =
        state
            .membership()
            .create_inventory(&body.name, body.description, caller.user_id())?;
    Ok((StatusCode::CREATED, Json(inventory)))
}

pub(crate) async fn get<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Inventory>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    Ok(Json(state.catalog().get_inventory(id, caller.user_id())?))
}

pub(crate) async fn update<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<InventoryUpdate>,
) -> Result<Json<Inventory>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    Ok(Json(state.catalog().update_inventory(id, body, caller.user_id())?))
}

/// `DELETE /api/inventory/:id` - owner only.
pub(crate) async fn delete<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    state.membership().delete_inventory(id, caller.user_id())?;
    Ok(StatusCode::OK)
}

pub(crate) async fn list_products<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<InventoryProductView>>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    Ok(Json(state.catalog().list_inventory_products(id, caller.user_id())?))
}

pub(crate) async fn add_product<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<NewInventoryProduct>,
) -> Result<(StatusCode, Json<InventoryProductView>), ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    let view = state
        .catalog()
        .add_inventory_product(id, body, caller.user_id())?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `PUT /api/inventory/:id/products/:product` - `:product` is the product id.
pub(crate) async fn update_product<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath((id, product_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<LinkAmounts>,
) -> Result<Json<InventoryProduct>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    Ok(Json(
        state
            .catalog()
            .update_inventory_product(id, product_id, body, caller.user_id())?,
    ))
}

/// `DELETE /api/inventory/:id/products/:product` - `:product` is the product name.
pub(crate) async fn remove_product<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath((id, product_name)): ApiPath<(Uuid, String)>,
) -> Result<StatusCode, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    state
        .catalog()
        .remove_inventory_product(id, &product_name, caller.user_id())?;
    Ok(StatusCode::OK)
}

/// `POST /api/inventory/:id/bulk-remove-products` - body `{ "productIds": [...] }`.
pub(crate) async fn bulk_remove_products<S, D>(
    State(state): State<AppState<S, D>>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<BulkRemove>,
) -> Result<Json<BulkRemovalReport>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    Ok(Json(
        state
            .membership()
            .bulk_remove_products(id, &body.product_ids, caller.user_id())?,
    ))
}
