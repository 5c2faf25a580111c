//! Error types for Wrath

use thiserror::Error;

/// The main error type for Wrath operations
#[derive(Debug, Error)]
pub enum WrathError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialization error: {0}")]
    TomlSer(String),

    #[error("Listener error: {0}")]
    Listener(String),

    #[error("{} listener(s) failed: {}", .0.len(), .0.join("; "))]
    ListenerFailures(Vec<String>),

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Capture error: {0}")]
    Capture(String),
}

/// Result type alias for Wrath operations
pub type Result<T> = std::result::Result<T, WrathError>;

impl From<toml::de::Error> for WrathError {
    fn from(err: toml::de::Error) -> Self {
        WrathError::TomlParse(err.to_string())
    }
}

impl From<toml::ser::Error> for WrathError {
    fn from(err: toml::ser::Error) -> Self {
        WrathError::TomlSer(err.to_string())
    }
}
