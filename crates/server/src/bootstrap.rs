use thiserror::Error;
use tracing::info;

use vouchers_core::config::{AppConfig, ConfigError, LoadOptions};
use vouchers_db::{RepositoryError, Storage};

use crate::api::{self, AppState};
use crate::health;

pub struct Application {
    pub config: AppConfig,
    pub storage: Storage,
}

impl Application {
    /// REST routes plus `/health`, sharing one storage handle.
    pub fn router(&self) -> axum::Router {
        api::router(AppState::from_storage(&self.storage)).merge(health::router(self.storage.clone()))
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("storage initialization failed: {0}")]
    Storage(#[source] RepositoryError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        backend = config.storage.backend.as_str(),
        "starting application bootstrap"
    );

    let storage = Storage::open(&config).await.map_err(BootstrapError::Storage)?;
    info!(
        event_name = "system.bootstrap.storage_ready",
        correlation_id = "bootstrap",
        backend = storage.backend.as_str(),
        "storage backend ready"
    );

    Ok(Application { config, storage })
}
