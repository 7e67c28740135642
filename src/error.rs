#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Remote read failed. Nothing was cached; the caller decides whether
    /// to retry.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// Remote write failed. The invalidation protocol did not run.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
