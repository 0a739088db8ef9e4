//! HTTP API - maps REST routes onto membership and catalog operations.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health` - liveness, no authentication.
//! - everything under `/api` - requires `Authorization: Bearer <jwt>`. The
//!   caller is taken from the verified token, never from the path or body.
//!
//! Errors are returned as `{ "error": "<message>" }` with the matching status.
//!
//! ## Example
//!
//! ```ignore
//! use home_inventory::api::{self, AppState};
//! use home_inventory::identity::{StaticDirectory, TokenVerifier};
//! use home_inventory::store::InMemoryStore;
//!
//! let verifier = TokenVerifier::with_secret(issuer, audience, b"secret");
//! let state = AppState::new(InMemoryStore::new(), verifier, StaticDirectory::default());
//!
//! // Get the router to compose with other axum routes
//! let app = api::router(state.clone());
//!
//! // Or serve directly
//! api::serve(state, "0.0.0.0:8080".parse()?, std::future::pending()).await?;
//! ```

mod caller;
mod error;
mod extract;
mod handlers;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::catalog::Catalog;
use crate::identity::{IdentityDirectory, TokenVerifier};
use crate::membership::MembershipEngine;
use crate::store::InventoryStore;

pub use caller::Caller;
pub use error::ApiError;

/// Shared state of the router.
pub struct AppState<S, D> {
    membership: MembershipEngine<S>,
    catalog: Catalog<S>,
    verifier: Arc<TokenVerifier>,
    directory: Arc<D>,
}

impl<S: Clone, D> Clone for AppState<S, D> {
    fn clone(&self) -> Self {
        Self {
            membership: self.membership.clone(),
            catalog: self.catalog.clone(),
            verifier: Arc::clone(&self.verifier),
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<S, D> AppState<S, D>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    pub fn new(store: S, verifier: TokenVerifier, directory: D) -> Self {
        Self {
            membership: MembershipEngine::new(store.clone()),
            catalog: Catalog::new(store),
            verifier: Arc::new(verifier),
            directory: Arc::new(directory),
        }
    }

    pub fn membership(&self) -> &MembershipEngine<S> {
        &self.membership
    }

    pub fn catalog(&self) -> &Catalog<S> {
        &self.catalog
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }
}

/// Build the axum `Router` for the whole API.
pub fn router<S, D>(state: AppState<S, D>) -> Router
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    use handlers::{inventory, members, products, users};

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/whoami", get(users::whoami::<S, D>))
        .route("/api/inventory", post(inventory::create::<S, D>))
        .route(
            "/api/inventory/:id",
            get(inventory::get::<S, D>)
                .put(inventory::update::<S, D>)
                .delete(inventory::delete::<S, D>),
        )
        .route(
            "/api/inventory/:id/members",
            get(members::list::<S, D>).post(members::add::<S, D>),
        )
        .route(
            "/api/inventory/:id/members/:user_id",
            axum::routing::delete(members::remove::<S, D>),
        )
        .route("/api/inventory/:id/owner", put(members::transfer_owner::<S, D>))
        .route(
            "/api/inventory/:id/products",
            get(inventory::list_products::<S, D>).post(inventory::add_product::<S, D>),
        )
        .route(
            "/api/inventory/:id/bulk-remove-products",
            post(inventory::bulk_remove_products::<S, D>),
        )
        .route(
            "/api/inventory/:id/products/:product",
            put(inventory::update_product::<S, D>).delete(inventory::remove_product::<S, D>),
        )
        .route(
            "/api/products",
            get(products::list::<S, D>).post(products::create::<S, D>),
        )
        .route(
            "/api/products/:name",
            get(products::get::<S, D>)
                .put(products::update::<S, D>)
                .delete(products::delete::<S, D>),
        )
        .route("/api/users", get(users::list_profiles::<S, D>))
        .route("/api/users/:user_id/profile", get(users::profile::<S, D>))
        .route(
            "/api/users/:user_id/inventories",
            get(users::inventories::<S, D>),
        )
        .with_state(state)
}

/// Serve the API at `addr` until `shutdown` resolves.
pub async fn serve<S, D>(
    state: AppState<S, D>,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
