use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid event timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("Malformed event payload: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    StoreError(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
