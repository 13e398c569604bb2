use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::application::ports::{DownloadRequest, Downloader, JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStatus, JobUpdate, MAX_PROGRESS};

/// Terminal result of one executor run, as far as the executor could record it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed,
    /// A status write was rejected by the store (e.g. the job was deleted
    /// mid-run). Nothing further is written for this run.
    Abandoned,
}

/// Drives one job from `queued` through `downloading` to a terminal status.
///
/// Failures never propagate to the caller: a downloader error becomes a
/// `failed` record and a store error is logged and swallowed.
pub struct DownloadExecutor {
    job_repository: Arc<dyn JobRepository>,
    downloader: Arc<dyn Downloader>,
    permits: Option<Arc<Semaphore>>,
    max_concurrent_downloads: Option<usize>,
}

impl DownloadExecutor {
    /// `max_concurrent_downloads = None` lets every job run its downloader
    /// immediately. With a bound, jobs wait for a permit while still `queued`.
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        downloader: Arc<dyn Downloader>,
        max_concurrent_downloads: Option<usize>,
    ) -> Self {
        let max_concurrent_downloads = max_concurrent_downloads.map(|n| n.max(1));
        Self {
            job_repository,
            downloader,
            permits: max_concurrent_downloads.map(|n| Arc::new(Semaphore::new(n))),
            max_concurrent_downloads,
        }
    }

    pub fn max_concurrent_downloads(&self) -> Option<usize> {
        self.max_concurrent_downloads
    }

    /// Fire and forget: the returned handle may be dropped without affecting the run.
    pub fn spawn(self: &Arc<Self>, job: Job) -> JoinHandle<JobOutcome> {
        let executor = Arc::clone(self);
        tokio::spawn(async move { executor.run(job).await })
    }

    #[tracing::instrument(skip(self, job), fields(job_id = %job.id, url = %job.url))]
    pub async fn run(&self, job: Job) -> JobOutcome {
        let _permit = match &self.permits {
            Some(permits) => match Arc::clone(permits).acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(e) => {
                    tracing::error!(error = %e, "Download permits closed");
                    return JobOutcome::Abandoned;
                }
            },
            None => None,
        };

        match self.execute(&job).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Failed to record job status, abandoning run");
                JobOutcome::Abandoned
            }
        }
    }

    async fn execute(&self, job: &Job) -> Result<JobOutcome, RepositoryError> {
        self.transition(
            job.id,
            JobUpdate::status(JobStatus::Downloading).with_progress(0),
        )
        .await?;

        let request = DownloadRequest::for_job(job);

        match self.downloader.download(&request).await {
            Ok(output) => {
                tracing::debug!(stdout_len = output.stdout.len(), "Downloader finished");
                self.transition(
                    job.id,
                    JobUpdate::status(JobStatus::Completed).with_progress(MAX_PROGRESS),
                )
                .await?;
                tracing::info!("Download completed");
                Ok(JobOutcome::Completed)
            }
            Err(e) => {
                tracing::error!(error = %e, "Download failed");
                self.transition(
                    job.id,
                    JobUpdate::status(JobStatus::Failed).with_error(format!("Download failed: {}", e)),
                )
                .await?;
                Ok(JobOutcome::Failed)
            }
        }
    }

    async fn transition(&self, job_id: JobId, update: JobUpdate) -> Result<(), RepositoryError> {
        tracing::debug!(status = ?update.status, "Job status transition");
        self.job_repository.update(job_id, &update).await.map(|_| ())
    }
}
