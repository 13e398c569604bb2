mod chapter_range;
mod job;
mod job_id;
mod job_stats;
mod job_status;

pub use chapter_range::ChapterRange;
pub use job::{Job, JobUpdate, JobValidationError, MAX_PROGRESS, NewJob};
pub use job_id::JobId;
pub use job_stats::JobStats;
pub use job_status::JobStatus;
