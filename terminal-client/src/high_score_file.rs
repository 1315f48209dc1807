use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use snake_engine::GameError;
use snake_engine::config::{ConfigContentProvider, ConfigManager, FileContentConfigProvider, Validate};
use snake_engine::games::snake::HighScoreStore;
use snake_engine::log;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub score: u32,
    #[serde(default)]
    pub achieved_at: Option<String>,
}

impl Validate for HighScoreRecord {
    fn validate(&self) -> Result<(), GameError> {
        Ok(())
    }
}

/// High score kept in a small YAML file. Read or write failures are logged
/// and never interrupt a game.
pub struct FileHighScoreStore<P: ConfigContentProvider = FileContentConfigProvider> {
    manager: ConfigManager<P, HighScoreRecord>,
}

impl FileHighScoreStore {
    pub fn open(path: &Path) -> Self {
        Self { manager: ConfigManager::from_yaml_file(path) }
    }
}

impl<P: ConfigContentProvider> FileHighScoreStore<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { manager: ConfigManager::with_provider(provider) }
    }

    pub fn record(&self) -> Option<HighScoreRecord> {
        match self.manager.get_config() {
            Ok(record) => Some(record),
            Err(e) => {
                log!("Failed to read high score: {}", e);
                None
            }
        }
    }
}

impl<P: ConfigContentProvider + Send> HighScoreStore for FileHighScoreStore<P> {
    fn load(&self) -> u32 {
        self.record().map(|record| record.score).unwrap_or(0)
    }

    fn save(&mut self, score: u32) {
        let record = HighScoreRecord {
            score,
            achieved_at: Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        };
        if let Err(e) = self.manager.set_config(&record) {
            log!("Failed to save high score {}: {}", score, e);
        }
    }
}
