use std::sync::Arc;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStats, JobStatus, JobUpdate, NewJob};

use super::DownloadExecutor;

/// Request-facing operations over the job store. Creation also hands the
/// new job to the executor without waiting for it.
pub struct JobService {
    job_repository: Arc<dyn JobRepository>,
    executor: Arc<DownloadExecutor>,
}

impl JobService {
    pub fn new(job_repository: Arc<dyn JobRepository>, executor: Arc<DownloadExecutor>) -> Self {
        Self {
            job_repository,
            executor,
        }
    }

    pub async fn list(&self, status: Option<JobStatus>) -> Result<Vec<Job>, JobServiceError> {
        Ok(self.job_repository.list(status).await?)
    }

    pub async fn get(&self, id: JobId) -> Result<Job, JobServiceError> {
        Ok(self.job_repository.get(id).await?)
    }

    #[tracing::instrument(skip(self, new_job), fields(url = %new_job.url))]
    pub async fn create(&self, new_job: NewJob) -> Result<Job, JobServiceError> {
        new_job
            .validate()
            .map_err(|e| JobServiceError::InvalidArgument(e.to_string()))?;

        let job = self.job_repository.create(&new_job).await?;
        tracing::info!(job_id = %job.id, "Download job queued");

        drop(self.executor.spawn(job.clone()));

        Ok(job)
    }

    #[tracing::instrument(skip(self, update), fields(job_id = %id))]
    pub async fn update(&self, id: JobId, update: JobUpdate) -> Result<Job, JobServiceError> {
        update
            .validate()
            .map_err(|e| JobServiceError::InvalidArgument(e.to_string()))?;

        Ok(self.job_repository.update(id, &update).await?)
    }

    #[tracing::instrument(skip(self), fields(job_id = %id))]
    pub async fn delete(&self, id: JobId) -> Result<(), JobServiceError> {
        Ok(self.job_repository.delete(id).await?)
    }

    pub async fn stats(&self) -> Result<JobStats, JobServiceError> {
        Ok(self.job_repository.stats().await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("repository: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for JobServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(id) => JobServiceError::NotFound(id),
            RepositoryError::InvalidArgument(e) => JobServiceError::InvalidArgument(e.to_string()),
            other => JobServiceError::Repository(other),
        }
    }
}
