#[derive(Debug)]
pub enum GameError {
    Configuration(String),
    IndexOutOfRange { index: usize, len: usize },
    PlacementExhausted { requested: usize, available: usize },
    Io(std::io::Error),
    Serialization(String),
}

impl GameError {
    pub fn config(message: impl Into<String>) -> Self {
        GameError::Configuration(message.into())
    }

    /// Errors that must be rejected before a session starts.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            GameError::Configuration(_) | GameError::PlacementExhausted { .. }
        )
    }
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::Configuration(message) => write!(f, "Configuration error: {}", message),
            GameError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range for {} entries", index, len)
            }
            GameError::PlacementExhausted { requested, available } => write!(
                f,
                "Cannot place {} cells, only {} free cells available",
                requested, available
            ),
            GameError::Io(e) => write!(f, "IO error: {}", e),
            GameError::Serialization(message) => write!(f, "Serialization error: {}", message),
        }
    }
}

impl std::error::Error for GameError {}

impl From<std::io::Error> for GameError {
    fn from(e: std::io::Error) -> Self {
        GameError::Io(e)
    }
}

impl From<serde_yaml_ng::Error> for GameError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        GameError::Serialization(e.to_string())
    }
}
