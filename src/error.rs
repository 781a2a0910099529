// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad CLI arguments or startup configuration. Fatal, aborts before any
    /// network activity.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transient network/parse failure inside one adapter. Retried, then
    /// downgraded to an empty contribution.
    #[error("adapter '{source_id}' failed: {message}")]
    Adapter { source_id: String, message: String },

    /// A single malformed raw record. The record is dropped, the run
    /// continues.
    #[error("invalid record from '{source_id}': {message}")]
    Validation { source_id: String, message: String },

    /// Failure writing one requested output format. Other formats are still
    /// attempted.
    #[error("export to {path} failed: {message}")]
    Export { path: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn adapter(source_id: &str, message: impl std::fmt::Display) -> Self {
        Error::Adapter {
            source_id: source_id.to_string(),
            message: message.to_string(),
        }
    }

    pub fn validation(source_id: &str, message: impl std::fmt::Display) -> Self {
        Error::Validation {
            source_id: source_id.to_string(),
            message: message.to_string(),
        }
    }

    pub fn export(path: &str, message: impl std::fmt::Display) -> Self {
        Error::Export {
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}
