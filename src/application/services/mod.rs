mod download_executor;
mod job_service;

pub use download_executor::{DownloadExecutor, JobOutcome};
pub use job_service::{JobService, JobServiceError};
