use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures reported by a catalog or booster source. None of them are retried.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("the rate limit has been exceeded")]
    RateLimited,
    #[error("catalog error: {0}")]
    Remote(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("couldn't find a set for \"{0}\"")]
    NotFound(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("io error at {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
    #[error("serialize error: {0}")]
    Serialize(String),
}

impl CacheError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}
