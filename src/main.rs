use std::net::SocketAddr;
use std::process::ExitCode;

use home_inventory::api::{self, AppState};
use home_inventory::config::{AppConfig, StorageBackend};
use home_inventory::identity::{IdentityDirectory, KeycloakDirectory, StaticDirectory, TokenVerifier};
use home_inventory::store::{InMemoryStore, InventoryStore, SqliteStore};
use home_inventory::telemetry;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("home-inventory: {}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = telemetry::init(&config.log) {
        eprintln!("home-inventory: failed to initialise logging: {}", err);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "home-inventory stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    let identity = &config.identity;

    let verifier = match &identity.hs256_secret {
        Some(secret) => {
            tracing::warn!("verifying tokens with a shared HS256 secret");
            TokenVerifier::with_secret(identity.issuer(), &identity.audience, secret.as_bytes())
        }
        None => {
            let http = reqwest::Client::builder()
                .timeout(identity.request_timeout())
                .build()?;
            TokenVerifier::discover(&http, &identity.authority, identity.issuer(), &identity.audience)
                .await?
        }
    };

    match config.storage.backend()? {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on shutdown");
            with_store(&config, InMemoryStore::new(), verifier).await
        }
        StorageBackend::SqliteMemory => {
            tracing::warn!("using a private sqlite database; data is lost on shutdown");
            with_store(&config, SqliteStore::open_in_memory()?, verifier).await
        }
        StorageBackend::SqliteFile(path) => {
            with_store(&config, SqliteStore::open(&path)?, verifier).await
        }
    }
}

async fn with_store<S>(config: &AppConfig, store: S, verifier: TokenVerifier) -> Result<(), BoxError>
where
    S: InventoryStore + Clone,
{
    let identity = &config.identity;
    match &identity.userinfo_endpoint {
        Some(endpoint) => {
            let directory = KeycloakDirectory::new(endpoint, identity.request_timeout())?;
            tracing::info!(userinfo = %directory.userinfo_endpoint(), "using provider directory");
            serve(config.server.bind, store, verifier, directory).await
        }
        None => {
            tracing::info!("no userinfo endpoint configured; user directory is empty");
            serve(config.server.bind, store, verifier, StaticDirectory::default()).await
        }
    }
}

async fn serve<S, D>(
    addr: SocketAddr,
    store: S,
    verifier: TokenVerifier,
    directory: D,
) -> Result<(), BoxError>
where
    S: InventoryStore + Clone,
    D: IdentityDirectory,
{
    let state = AppState::new(store, verifier, directory);
    api::serve(state, addr, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
