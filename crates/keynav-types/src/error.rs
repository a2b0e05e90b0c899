//! Error types for keynav.

use std::io;

/// Errors produced by keynav.
///
/// User-facing outcomes such as a declined confirmation or a page without a
/// matching link are not errors; they are reported through return values.
#[derive(Debug, thiserror::Error)]
pub enum KeynavError {
    #[error("config error: {0}")]
    Config(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("key mapping error: {0}")]
    Mapping(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("key notation error: {0}")]
    Key(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, KeynavError>;
