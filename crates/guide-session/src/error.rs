use intent_router::FallbackError;
use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems. Fatal: reported before any session starts.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("missing credential: set {0}")]
    MissingCredential(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Fallback(#[from] FallbackError),
    #[error("session I/O: {0}")]
    Io(#[from] std::io::Error),
}
