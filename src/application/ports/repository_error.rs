use crate::domain::{JobId, JobValidationError};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] JobValidationError),
}
