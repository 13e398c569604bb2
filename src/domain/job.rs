use super::{ChapterRange, JobId, JobStatus};
use chrono::{DateTime, Utc};
use serde_json::Value;

pub const MAX_PROGRESS: i32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub url: String,
    pub chapters: Option<Value>,
    pub start_chapter: Option<i32>,
    pub end_chapter: Option<i32>,
    pub status: JobStatus,
    pub progress: i32,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn from_new(id: JobId, new_job: NewJob, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            url: new_job.url,
            chapters: new_job.chapters,
            start_chapter: new_job.start_chapter,
            end_chapter: new_job.end_chapter,
            status: JobStatus::Queued,
            progress: 0,
            error: None,
            created_at,
            completed_at: None,
        }
    }

    pub fn chapter_range(&self) -> Option<ChapterRange> {
        ChapterRange::from_bounds(self.start_chapter, self.end_chapter)
    }

    /// Applies the provided fields only. Moving to `completed` stamps
    /// `completed_at`. An error is kept only while the resulting status is
    /// `failed`; any other status clears it, including an explicit one.
    pub fn apply(&mut self, update: &JobUpdate, now: DateTime<Utc>) {
        if let Some(status) = update.status {
            self.status = status;
            if status == JobStatus::Completed {
                self.completed_at = Some(now);
            }
        }
        if let Some(progress) = update.progress {
            self.progress = progress;
        }
        if let Some(error) = &update.error {
            self.error = error.clone();
        }
        if self.status != JobStatus::Failed {
            self.error = None;
        }
    }
}

/// Fields accepted when a job is submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewJob {
    pub url: String,
    pub chapters: Option<Value>,
    pub start_chapter: Option<i32>,
    pub end_chapter: Option<i32>,
}

impl NewJob {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_chapter_bounds(mut self, start: Option<i32>, end: Option<i32>) -> Self {
        self.start_chapter = start;
        self.end_chapter = end;
        self
    }

    pub fn with_chapters(mut self, chapters: Value) -> Self {
        self.chapters = Some(chapters);
        self
    }

    pub fn validate(&self) -> Result<(), JobValidationError> {
        if self.url.trim().is_empty() {
            return Err(JobValidationError::MissingUrl);
        }
        Ok(())
    }
}

/// Partial update. `error: Some(None)` clears the error, `None` leaves it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub progress: Option<i32>,
    pub error: Option<Option<String>>,
}

impl JobUpdate {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_progress(mut self, progress: i32) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(Some(error.into()));
        self
    }

    pub fn validate(&self) -> Result<(), JobValidationError> {
        match self.progress {
            Some(progress) if !(0..=MAX_PROGRESS).contains(&progress) => {
                Err(JobValidationError::ProgressOutOfRange(progress))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobValidationError {
    #[error("URL is required")]
    MissingUrl,
    #[error("progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(i32),
}
