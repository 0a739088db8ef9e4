//! Startup configuration.
//!
//! Read from the optional file `config/home_inventory.toml`, then from
//! environment variables prefixed `HOME_INVENTORY` with `__` between keys:
//!
//! ```text
//! HOME_INVENTORY__SERVER__BIND=0.0.0.0:8080
//! HOME_INVENTORY__IDENTITY__AUTHORITY=https://auth.example.com/realms/home
//! HOME_INVENTORY__IDENTITY__AUDIENCE=home-inventory
//! HOME_INVENTORY__STORAGE__DATABASE_URL=sqlite:///var/lib/home-inventory/inventory.db
//! HOME_INVENTORY__LOG__JSON=true
//! ```
//!
//! The loaded value is validated before it is returned.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use reqwest::Url;
use serde::Deserialize;

const CONFIG_FILE: &str = "config/home_inventory";
const ENV_PREFIX: &str = "HOME_INVENTORY";

#[derive(Debug)]
pub enum ConfigError {
    /// A source could not be read or did not deserialize.
    Load(config::ConfigError),
    /// A value is missing or out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Load(e) => write!(f, "failed to load configuration: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Load(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// OpenID provider settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// Realm URL; JWKS discovery starts here.
    #[serde(default)]
    pub authority: String,
    #[serde(default)]
    pub audience: String,
    /// Expected `iss` claim. Defaults to `authority`.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Verify HS256 tokens with this secret instead of the provider's keys.
    #[serde(default)]
    pub hs256_secret: Option<String>,
    /// Enables profile lookups against the provider.
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    5
}

impl IdentityConfig {
    pub fn issuer(&self) -> &str {
        self.issuer.as_deref().unwrap_or(&self.authority)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where inventories are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// `sqlite://<path>` for a database file, `sqlite::memory:` for a
    /// throwaway database, or `memory` for the in-process tables.
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://home_inventory.db".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    SqliteMemory,
    SqliteFile(PathBuf),
}

impl StorageConfig {
    pub fn backend(&self) -> Result<StorageBackend, ConfigError> {
        let url = self.database_url.trim();
        if url == "memory" {
            return Ok(StorageBackend::Memory);
        }
        if url == "sqlite::memory:" {
            return Ok(StorageBackend::SqliteMemory);
        }
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .ok_or_else(|| {
                invalid(format!(
                    "storage.database_url must be sqlite://<path>, sqlite::memory: or memory, got {:?}",
                    url
                ))
            })?;
        if path.trim().is_empty() {
            return Err(invalid("storage.database_url has no database path"));
        }
        Ok(StorageBackend::SqliteFile(PathBuf::from(path)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load from `config/home_inventory.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::with_name(CONFIG_FILE).required(false)))
    }

    /// Load from the given file (required) and the environment.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::with_name(path)))
    }

    /// Parse TOML text, without consulting the environment.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Self::finish(settings)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self, ConfigError> {
        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on missing or unusable values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let identity = &self.identity;

        if identity.authority.trim().is_empty() {
            return Err(invalid("identity.authority is required"));
        }
        Url::parse(&identity.authority)
            .map_err(|e| invalid(format!("identity.authority: {}", e)))?;
        if identity.audience.trim().is_empty() {
            return Err(invalid("identity.audience is required"));
        }
        if identity.issuer().trim().is_empty() {
            return Err(invalid("identity.issuer must not be blank"));
        }
        if let Some(secret) = &identity.hs256_secret {
            if secret.is_empty() {
                return Err(invalid("identity.hs256_secret must not be empty"));
            }
        }
        if let Some(endpoint) = &identity.userinfo_endpoint {
            Url::parse(endpoint)
                .map_err(|e| invalid(format!("identity.userinfo_endpoint: {}", e)))?;
        }
        if identity.request_timeout_secs == 0 {
            return Err(invalid("identity.request_timeout_secs must be greater than 0"));
        }
        self.storage.backend()?;
        if self.log.filter.trim().is_empty() {
            return Err(invalid("log.filter must not be blank"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}
