//! `/api/products` - the global product catalog, addressed by name.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::extract::{ApiJson, ApiPath};
use crate::api::{ApiError, AppState, Caller};
use crate::catalog::ProductInput;
use crate::identity::IdentityDirectory;
use crate::model::Product;
use crate::store::InventoryStore;

pub(crate) async fn list<S, D>(
    State(state): State<AppState<S, D>>,
    _caller: Caller,
) -> Result<Json<Vec<Product>>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    Ok(Json(state.catalog().list_products()?))
}

pub(crate) async fn create<S, D>(
    State(state): State<AppState<S, D>>,
    _caller: Caller,
    ApiJson(body): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<Product>), ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    let product = state.catalog().create_product(body)?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub(crate) async fn get<S, D>(
    State(state): State<AppState<S, D>>,
    _caller: Caller,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<Product>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    Ok(Json(state.catalog().get_product(&name)?))
}

pub(crate) async fn update<S, D>(
    State(state): State<AppState<S, D>>,
    _caller: Caller,
    ApiPath(name): ApiPath<String>,
    ApiJson(body): ApiJson<ProductInput>,
) -> Result<Json<Product>, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    Ok(Json(state.catalog().update_product(&name, body)?))
}

/// Also removes the product from every inventory tracking it.
pub(crate) async fn delete<S, D>(
    State(state): State<AppState<S, D>>,
    _caller: Caller,
    ApiPath(name): ApiPath<String>,
) -> Result<StatusCode, ApiError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    state.catalog().delete_product(&name)?;
    Ok(StatusCode::OK)
}
