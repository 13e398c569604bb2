use crate::domain::{Job, JobId, JobStats, JobStatus, JobUpdate, NewJob};
use async_trait::async_trait;

use super::RepositoryError;

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Newest `created_at` first; `None` returns every job.
    async fn list(&self, status: Option<JobStatus>) -> Result<Vec<Job>, RepositoryError>;

    async fn get(&self, id: JobId) -> Result<Job, RepositoryError>;

    async fn create(&self, new_job: &NewJob) -> Result<Job, RepositoryError>;

    /// Setting status to `completed` stamps `completed_at` in the same write.
    async fn update(&self, id: JobId, update: &JobUpdate) -> Result<Job, RepositoryError>;

    async fn delete(&self, id: JobId) -> Result<(), RepositoryError>;

    async fn stats(&self) -> Result<JobStats, RepositoryError>;

    /// Releases the underlying connections on shutdown.
    async fn close(&self) {}
}
