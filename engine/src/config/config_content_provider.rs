use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::GameError;

pub trait ConfigContentProvider {
    fn get_config_content(&self) -> Result<Option<String>, GameError>;
    fn set_config_content(&self, content: &str) -> Result<(), GameError>;
}

pub struct FileContentConfigProvider {
    file_path: PathBuf,
}

impl FileContentConfigProvider {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self { file_path: file_path.into() }
    }
}

impl ConfigContentProvider for FileContentConfigProvider {
    fn get_config_content(&self) -> Result<Option<String>, GameError> {
        match std::fs::read_to_string(&self.file_path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(GameError::Io(err)),
        }
    }

    fn set_config_content(&self, content: &str) -> Result<(), GameError> {
        std::fs::write(&self.file_path, content)?;
        Ok(())
    }
}

/// Keeps the serialized config in memory. Useful for tests and for stores
/// that must not touch the file system.
#[derive(Default)]
pub struct MemoryContentConfigProvider {
    content: Mutex<Option<String>>,
}

impl MemoryContentConfigProvider {
    pub fn new(content: Option<String>) -> Self {
        Self { content: Mutex::new(content) }
    }

    pub fn content(&self) -> Option<String> {
        self.content.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ConfigContentProvider for MemoryContentConfigProvider {
    fn get_config_content(&self) -> Result<Option<String>, GameError> {
        Ok(self.content())
    }

    fn set_config_content(&self, content: &str) -> Result<(), GameError> {
        *self.content.lock().unwrap_or_else(|e| e.into_inner()) = Some(content.to_string());
        Ok(())
    }
}
