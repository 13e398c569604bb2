use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStats, JobStatus, JobUpdate, NewJob};

const JOB_COLUMNS: &str = "id, url, chapters, start_chapter, end_chapter, status, progress, error, created_at, completed_at";

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct JobRow {
    id: i64,
    url: String,
    chapters: Option<Value>,
    start_chapter: Option<i32>,
    end_chapter: Option<i32>,
    status: String,
    progress: i32,
    error: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobRow> for Job {
    type Error = RepositoryError;

    fn try_from(r: JobRow) -> Result<Self, Self::Error> {
        let status = r
            .status
            .parse::<JobStatus>()
            .map_err(RepositoryError::QueryFailed)?;

        Ok(Job {
            id: JobId::new(r.id),
            url: r.url,
            chapters: r.chapters,
            start_chapter: r.start_chapter,
            end_chapter: r.end_chapter,
            status,
            progress: r.progress,
            error: r.error,
            created_at: r.created_at,
            completed_at: r.completed_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total: i64,
    completed: i64,
    failed: i64,
    active: i64,
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self), fields(status = ?status))]
    async fn list(&self, status: Option<JobStatus>) -> Result<Vec<Job>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM download_jobs
            WHERE ($1::text IS NULL OR status = $1::text)
            ORDER BY created_at DESC, id DESC
            "#
        );

        let rows = sqlx::query_as::<_, JobRow>(&query)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(Job::try_from).collect()
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn get(&self, id: JobId) -> Result<Job, RepositoryError> {
        let query = format!("SELECT {JOB_COLUMNS} FROM download_jobs WHERE id = $1");

        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        match row {
            Some(r) => Job::try_from(r),
            None => Err(RepositoryError::NotFound(id)),
        }
    }

    #[instrument(skip(self, new_job), fields(url = %new_job.url))]
    async fn create(&self, new_job: &NewJob) -> Result<Job, RepositoryError> {
        new_job.validate()?;

        let query = format!(
            r#"
            INSERT INTO download_jobs (url, chapters, start_chapter, end_chapter, status, progress, created_at)
            VALUES ($1, $2, $3, $4, $5, 0, $6)
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(&new_job.url)
            .bind(new_job.chapters.as_ref().map(Json))
            .bind(new_job.start_chapter)
            .bind(new_job.end_chapter)
            .bind(JobStatus::Queued.as_str())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Job::try_from(row)
    }

    #[instrument(skip(self, update), fields(job_id = %id, status = ?update.status))]
    async fn update(&self, id: JobId, update: &JobUpdate) -> Result<Job, RepositoryError> {
        update.validate()?;

        let query = format!(
            r#"
            UPDATE download_jobs
            SET status = COALESCE($1::text, status),
                progress = COALESCE($2::int4, progress),
                error = CASE
                    WHEN COALESCE($1::text, status) <> 'failed' THEN NULL
                    WHEN $3::boolean THEN $4::text
                    ELSE error
                END,
                completed_at = CASE
                    WHEN $1::text = 'completed' THEN $5::timestamptz
                    ELSE completed_at
                END
            WHERE id = $6
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(update.status.map(|s| s.as_str()))
            .bind(update.progress)
            .bind(update.error.is_some())
            .bind(update.error.clone().flatten())
            .bind(Utc::now())
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        match row {
            Some(r) => Job::try_from(r),
            None => Err(RepositoryError::NotFound(id)),
        }
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn delete(&self, id: JobId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM download_jobs WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> Result<JobStats, RepositoryError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE status = 'failed') AS failed,
                COUNT(*) FILTER (WHERE status IN ('queued', 'downloading')) AS active
            FROM download_jobs
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(JobStats {
            total: row.total as u64,
            completed: row.completed as u64,
            failed: row.failed as u64,
            active: row.active as u64,
        })
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL connection pool closed");
    }
}
