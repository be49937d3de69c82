//! Configuration persistence port

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Port for loading and saving the persisted configuration
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the persisted configuration, or an empty one if no file exists
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Persist the configuration, creating parent directories as needed
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Create a fresh config file with defaults. Fails if one exists.
    async fn init(&self) -> Result<PathBuf, ConfigError>;

    /// Path of the config file
    fn path(&self) -> PathBuf;

    /// Whether a config file exists on disk
    fn exists(&self) -> bool;
}
