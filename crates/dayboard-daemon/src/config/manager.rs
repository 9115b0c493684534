//! Configuration manager

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use dayboard_core::{
    Result as CoreResult,
    models::Config,
    storage::{ConfigStorage, init_config_dir},
};

/// Config manager error
#[derive(Debug, thiserror::Error)]
pub enum ConfigManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] dayboard_core::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigManagerError>;

/// Manages application configuration
pub struct ConfigManager {
    storage: ConfigStorage,
    config: Arc<RwLock<Config>>,
}

impl ConfigManager {
    pub fn new() -> CoreResult<Self> {
        Self::with_dir(init_config_dir()?)
    }

    /// Load (or create) the config file under an explicit directory.
    pub fn with_dir(config_dir: PathBuf) -> CoreResult<Self> {
        let storage = ConfigStorage::new(config_dir);
        let config = storage.load()?;

        Ok(Self {
            storage,
            config: Arc::new(RwLock::new(config)),
        })
    }

    pub async fn get(&self) -> Config {
        self.config.read().await.clone()
    }

    /// Validate, save, then swap the in-memory copy.
    async fn update(&self, config: Config) -> Result<Config> {
        config
            .validate()
            .map_err(|e| ConfigManagerError::Invalid(e.to_string()))?;

        self.storage.save(&config)?;

        {
            let mut current = self.config.write().await;
            *current = config.clone();
        }

        Ok(config)
    }

    /// Persist new default phase durations. A running timer is not touched.
    pub async fn update_timer_config(
        &self,
        work_minutes: Option<u32>,
        break_minutes: Option<u32>,
    ) -> Result<Config> {
        let mut config = self.get().await;

        if let Some(minutes) = work_minutes {
            config.timer.work_minutes = minutes;
        }

        if let Some(minutes) = break_minutes {
            config.timer.break_minutes = minutes;
        }

        self.update(config).await
    }
}
