/// Error Taxonomy Module
///
/// Typed errors for the chain client / publisher boundary. Orchestration code
/// above that boundary (pipeline, supervisor, main) uses `anyhow` the way the
/// rest of this crate does; `ChainError` exists so callers can match on kind,
/// per the propagation policy around retries and fatal configuration.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("slot has no block")]
    EmptySlot,

    #[error("publish failed: {0}")]
    PublishFailure(String),

    #[error("fatal configuration error: {0}")]
    ConfigurationFatal(String),
}

impl ChainError {
    /// Whether the Slot Processor should spend one of its retry attempts on this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChainError::Transport(_) | ChainError::Decode(_) | ChainError::PublishFailure(_))
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChainError::Decode(err.to_string())
        } else {
            ChainError::Transport(err.to_string())
        }
    }
}
