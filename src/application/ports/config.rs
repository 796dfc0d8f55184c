//! Persistent settings port
//!
//! The stored document carries the API key, response language, capture
//! limit, model names per tier, endpoint override and the precursor
//! library. Command-line flags are merged over it by the caller.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for reading and writing the lab-assist settings file
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the stored settings.
    ///
    /// A missing file is not an error: every field comes back `None` so the
    /// built-in defaults apply after merging.
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Replace the stored settings, creating parent directories as needed.
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Where the settings live
    fn path(&self) -> PathBuf;

    fn exists(&self) -> bool;

    /// Write the stock settings and return where they went.
    /// Never overwrites an existing file.
    async fn init(&self) -> Result<PathBuf, ConfigError> {
        let path = self.path();
        if self.exists() {
            return Err(ConfigError::AlreadyExists(path.display().to_string()));
        }
        self.save(&AppConfig::defaults()).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workspace::seed_precursors;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Option<AppConfig>>,
    }

    #[async_trait]
    impl ConfigStore for MemoryStore {
        async fn load(&self) -> Result<AppConfig, ConfigError> {
            Ok(self.saved.lock().unwrap().clone().unwrap_or_else(AppConfig::empty))
        }

        async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
            *self.saved.lock().unwrap() = Some(config.clone());
            Ok(())
        }

        fn path(&self) -> PathBuf {
            PathBuf::from("memory://lab-assist")
        }

        fn exists(&self) -> bool {
            self.saved.lock().unwrap().is_some()
        }
    }

    #[tokio::test]
    async fn init_writes_stock_settings_once() {
        let store = MemoryStore::default();

        let path = store.init().await.unwrap();
        assert_eq!(path, PathBuf::from("memory://lab-assist"));

        let config = store.load().await.unwrap();
        assert_eq!(config, AppConfig::defaults());
        assert_eq!(config.max_duration.as_deref(), Some("1m"));
        assert_eq!(config.precursors_or_default(), seed_precursors());

        let err = store.init().await.unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(p) if p == "memory://lab-assist"));
    }
}
