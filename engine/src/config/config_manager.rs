use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::GameError;
use super::{
    ConfigContentProvider, ConfigSerializer, FileContentConfigProvider, Validate,
    YamlConfigSerializer,
};

pub struct ConfigManager<TConfigContentProvider, TConfig, TConfigSerializer = YamlConfigSerializer>
where
    TConfigContentProvider: ConfigContentProvider,
    TConfig: Clone + for<'de> Deserialize<'de> + Serialize + Validate + Default,
    TConfigSerializer: ConfigSerializer<TConfig>,
{
    config_serializer: TConfigSerializer,
    config_content_provider: TConfigContentProvider,
    config: Arc<Mutex<Option<TConfig>>>,
}

impl<TConfig> ConfigManager<FileContentConfigProvider, TConfig, YamlConfigSerializer>
where
    TConfig: Clone + for<'de> Deserialize<'de> + Serialize + Validate + Default,
{
    pub fn from_yaml_file(file_path: &Path) -> Self {
        Self::with_provider(FileContentConfigProvider::new(file_path))
    }
}

impl<TConfigContentProvider, TConfig> ConfigManager<TConfigContentProvider, TConfig, YamlConfigSerializer>
where
    TConfigContentProvider: ConfigContentProvider,
    TConfig: Clone + for<'de> Deserialize<'de> + Serialize + Validate + Default,
{
    pub fn with_provider(config_content_provider: TConfigContentProvider) -> Self {
        Self {
            config: Arc::new(Mutex::new(None)),
            config_content_provider,
            config_serializer: YamlConfigSerializer::new(),
        }
    }
}

impl<TConfigContentProvider, TConfig, TConfigSerializer>
    ConfigManager<TConfigContentProvider, TConfig, TConfigSerializer>
where
    TConfigContentProvider: ConfigContentProvider,
    TConfig: Clone + for<'de> Deserialize<'de> + Serialize + Validate + Default,
    TConfigSerializer: ConfigSerializer<TConfig>,
{
    /// Returns the cached config, loading it on first use. A missing source
    /// yields `TConfig::default()` without caching it.
    pub fn get_config(&self) -> Result<TConfig, GameError> {
        let mut current = self.config.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(config) = current.as_ref() {
            return Ok(config.clone());
        }

        if let Some(config_data) = self.config_content_provider.get_config_content()? {
            let config = self.config_serializer.deserialize(&config_data)?;
            config.validate()?;

            *current = Some(config.clone());
            return Ok(config);
        }

        Ok(TConfig::default())
    }

    pub fn set_config(&self, config: &TConfig) -> Result<(), GameError> {
        config.validate()?;

        let serialized_config = self.config_serializer.serialize(config)?;
        self.config_content_provider
            .set_config_content(&serialized_config)?;

        let mut current = self.config.lock().unwrap_or_else(|e| e.into_inner());
        *current = Some(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryContentConfigProvider;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestConfig {
        width: i32,
        name: String,
    }

    impl Default for TestConfig {
        fn default() -> Self {
            Self { width: 20, name: "default".to_string() }
        }
    }

    impl Validate for TestConfig {
        fn validate(&self) -> Result<(), GameError> {
            if self.width <= 0 {
                return Err(GameError::config("width must be positive"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_missing_content_returns_default() {
        let manager: ConfigManager<_, TestConfig> =
            ConfigManager::with_provider(MemoryContentConfigProvider::new(None));
        assert_eq!(manager.get_config().unwrap(), TestConfig::default());
    }

    #[test]
    fn test_set_then_get_round_trips_through_yaml() {
        let manager: ConfigManager<_, TestConfig> =
            ConfigManager::with_provider(MemoryContentConfigProvider::new(None));
        let config = TestConfig { width: 30, name: "wide".to_string() };
        manager.set_config(&config).unwrap();
        assert_eq!(manager.get_config().unwrap(), config);
    }

    #[test]
    fn test_invalid_content_is_rejected_on_load() {
        let provider = MemoryContentConfigProvider::new(Some("width: -1\nname: broken\n".to_string()));
        let manager: ConfigManager<_, TestConfig> = ConfigManager::with_provider(provider);
        let result = manager.get_config();
        assert!(matches!(result, Err(GameError::Configuration(_))));
    }

    #[test]
    fn test_invalid_config_is_not_written() {
        let manager: ConfigManager<_, TestConfig> =
            ConfigManager::with_provider(MemoryContentConfigProvider::new(None));
        let result = manager.set_config(&TestConfig { width: 0, name: "zero".to_string() });
        assert!(result.is_err());
        assert!(manager.config_content_provider.content().is_none());
    }

    #[test]
    fn test_malformed_yaml_is_serialization_error() {
        let provider = MemoryContentConfigProvider::new(Some("width: [oops".to_string()));
        let manager: ConfigManager<_, TestConfig> = ConfigManager::with_provider(provider);
        assert!(matches!(manager.get_config(), Err(GameError::Serialization(_))));
    }
}
