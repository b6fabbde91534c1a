use thiserror::Error;

/// Failure taxonomy of the answering pipeline.
///
/// An index that has not been built is deliberately absent: retrieval against
/// it degrades to an empty result instead of failing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Completion failed: {0}")]
    Completion(String),
}

pub type Result<T> = std::result::Result<T, Error>;
