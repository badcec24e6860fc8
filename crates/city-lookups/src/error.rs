use thiserror::Error;

pub type Result<T, E = RetrievalError> = core::result::Result<T, E>;

/// A weather or events lookup that could not produce data.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("network error: {0}")]
    Network(String),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("lookup unavailable: {0}")]
    Unavailable(String),
}
