use thiserror::Error;

pub type Result<T, E = EngineError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine not available in this build: {0}")]
    Unsupported(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
