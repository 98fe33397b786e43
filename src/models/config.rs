//! Runtime configuration of the web server.
//!
//! Values are layered from `config/default.yaml`, an optional
//! `config/{APP_ENV}.yaml` and `APP__*` environment variables, e.g.
//! `APP__STORE__DATABASE_URL`.

use std::sync::Arc;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::store::{DocumentStore, FirebaseStore, MemoryStore, StoreResult};

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";

/// Errors raised while loading [`ServerConfig`].
#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Which document store backs the repositories.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// In-process JSON tree; contents are lost on restart.
    #[default]
    Memory,
    /// Firebase Realtime Database over its REST interface.
    Firebase,
}

/// Document store connection options.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base URL of the hosted database, e.g. `https://<db>.firebaseio.com`.
    #[serde(default)]
    pub database_url: String,
    /// Database secret or ID token appended as `auth=`.
    #[serde(default)]
    pub auth_token: Option<String>,
    #[validate(range(min = 1))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl StoreConfig {
    /// Build the configured backend.
    pub fn connect(&self) -> StoreResult<Arc<dyn DocumentStore>> {
        match self.backend {
            StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreBackend::Firebase => Ok(Arc::new(FirebaseStore::new(
                &self.database_url,
                self.auth_token.clone(),
                Duration::from_secs(self.timeout_secs),
            )?)),
        }
    }
}

/// Configuration options of the web server.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Signing key for flash message cookies.
    #[validate(length(min = 64))]
    pub secret: String,
    /// Glob of tera templates to load.
    pub templates_dir: String,
    #[validate(nested)]
    pub store: StoreConfig,
}

impl ServerConfig {
    /// Load configuration for the environment named by `APP_ENV`.
    pub fn load() -> Result<Self, ServerConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
        log::info!("Loading configuration for environment: {app_env}");
        Self::load_from(CONFIG_DIR, &app_env)
    }

    /// Load configuration from `dir`, layering `default` and `app_env` files
    /// under environment overrides.
    pub fn load_from(dir: &str, app_env: &str) -> Result<Self, ServerConfigError> {
        let config = Config::builder()
            .set_default("address", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("templates_dir", "templates/**/*")?
            .set_default("store.backend", "memory")?
            .add_source(File::with_name(&format!("{dir}/default")).required(false))
            .add_source(File::with_name(&format!("{dir}/{app_env}")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        if server_config.store.backend == StoreBackend::Firebase
            && server_config.store.database_url.trim().is_empty()
        {
            return Err(ServerConfigError::Load(ConfigError::Message(
                "store.database_url is required for the firebase backend".to_string(),
            )));
        }

        Ok(server_config)
    }
}
