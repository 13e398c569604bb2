use std::io;

use async_trait::async_trait;

use crate::domain::{ChapterRange, Job};

/// Runs the external downloader for one job to completion.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutput, DownloaderError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub chapter_range: Option<ChapterRange>,
}

impl DownloadRequest {
    pub fn for_job(job: &Job) -> Self {
        Self {
            url: job.url.clone(),
            chapter_range: job.chapter_range(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloaderError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("downloader exited with {}: {stderr}", describe_exit(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },
    #[error("downloader output exceeded {limit} bytes")]
    OutputLimitExceeded { limit: usize },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "termination by signal".to_string(),
    }
}
