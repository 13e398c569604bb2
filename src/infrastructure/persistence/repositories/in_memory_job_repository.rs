use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStats, JobStatus, JobUpdate, NewJob};

/// Process-local job store. Ids start at 1 and are never reused.
pub struct InMemoryJobRepository {
    jobs: RwLock<BTreeMap<JobId, Job>>,
    next_id: AtomicI64,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn list(&self, status: Option<JobStatus>) -> Result<Vec<Job>, RepositoryError> {
        let jobs = self.jobs.read().await;
        let mut matching: Vec<Job> = jobs
            .values()
            .filter(|job| status.is_none_or(|s| job.status == s))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(matching)
    }

    async fn get(&self, id: JobId) -> Result<Job, RepositoryError> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn create(&self, new_job: &NewJob) -> Result<Job, RepositoryError> {
        new_job.validate()?;

        let id = JobId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let job = Job::from_new(id, new_job.clone(), Utc::now());

        self.jobs.write().await.insert(id, job.clone());

        Ok(job)
    }

    async fn update(&self, id: JobId, update: &JobUpdate) -> Result<Job, RepositoryError> {
        update.validate()?;

        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        job.apply(update, Utc::now());

        Ok(job.clone())
    }

    async fn delete(&self, id: JobId) -> Result<(), RepositoryError> {
        self.jobs
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn stats(&self) -> Result<JobStats, RepositoryError> {
        let jobs = self.jobs.read().await;
        Ok(JobStats::from_statuses(jobs.values().map(|job| &job.status)))
    }
}
