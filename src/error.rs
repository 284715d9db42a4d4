use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the corpus loader, the override registry and the recognition pipeline.
#[derive(Debug, Error)]
pub enum NerError {
    #[error("corpus file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid override rule at index {index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("failed to parse rules file {}: {source}", path.display())]
    RulesFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model error: {0}")]
    Model(String),

    #[error(transparent)]
    Tensor(#[from] candle_core::Error),

    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("recognition pipeline not initialized")]
    NotInitialized,

    #[error("recognition pipeline already initialized")]
    AlreadyInitialized,
}

impl NerError {
    /// Classify an `io::Error` raised while opening or reading `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            NerError::FileNotFound { path }
        } else {
            NerError::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, NerError>;
