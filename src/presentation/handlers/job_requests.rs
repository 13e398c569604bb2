use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{Job, JobStatus, JobUpdate, NewJob};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub url: Option<String>,
    pub chapters: Option<Value>,
    pub start_chapter: Option<Value>,
    pub end_chapter: Option<Value>,
}

impl CreateJobRequest {
    pub fn into_new_job(self) -> NewJob {
        NewJob {
            url: self.url.unwrap_or_default(),
            chapters: self.chapters.filter(|v| !v.is_null()),
            start_chapter: self.start_chapter.as_ref().and_then(parse_chapter_number),
            end_chapter: self.end_chapter.as_ref().and_then(parse_chapter_number),
        }
    }
}

/// Accepts a JSON integer or a string with a leading integer (`"12"`,
/// `" 7 chapters"`). Zero, null and non-numeric input mean "no chapter".
pub fn parse_chapter_number(value: &Value) -> Option<i32> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    }?;

    i32::try_from(parsed).ok().filter(|n| *n != 0)
}

fn leading_integer(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub status: Option<String>,
    pub progress: Option<i32>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub error: Option<Option<String>>,
}

impl UpdateJobRequest {
    pub fn into_update(self) -> Result<JobUpdate, String> {
        let status = self
            .status
            .map(|s| s.parse::<JobStatus>())
            .transpose()?;

        Ok(JobUpdate {
            status,
            progress: self.progress,
            error: self.error,
        })
    }
}

/// Distinguishes `"error": null` (clear) from an absent key (leave as is).
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<String>,
}

impl ListJobsQuery {
    pub fn status_filter(&self) -> Result<Option<JobStatus>, String> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse::<JobStatus>().map(Some),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: i64,
    pub url: String,
    pub chapters: Option<Value>,
    pub start_chapter: Option<i32>,
    pub end_chapter: Option<i32>,
    pub status: String,
    pub progress: i32,
    pub error: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id.as_i64(),
            url: job.url,
            chapters: job.chapters,
            start_chapter: job.start_chapter,
            end_chapter: job.end_chapter,
            status: job.status.as_str().to_string(),
            progress: job.progress,
            error: job.error,
            created_at: job.created_at.to_rfc3339(),
            completed_at: job.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub active: u64,
}
