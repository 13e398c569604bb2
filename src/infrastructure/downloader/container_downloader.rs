use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{DownloadOutput, DownloadRequest, Downloader, DownloaderError};
use crate::presentation::config::DownloaderSettings;

use super::bounded_output::capture_output;

/// Runs the downloader image through a container runtime:
/// `<runtime> run --rm -v <downloads>:<dir> <image> -o <dir> [--start N --end M] <url>`.
pub struct ContainerDownloader {
    runtime: String,
    image: String,
    downloads_path: PathBuf,
    container_dir: String,
    max_output_bytes: usize,
}

impl ContainerDownloader {
    pub fn new(settings: &DownloaderSettings) -> Self {
        Self {
            runtime: settings.runtime.clone(),
            image: settings.image.clone(),
            downloads_path: PathBuf::from(&settings.downloads_path),
            container_dir: settings.container_dir.clone(),
            max_output_bytes: settings.max_output_bytes,
        }
    }

    pub fn program(&self) -> &str {
        &self.runtime
    }

    /// Arguments are passed as argv, so the URL needs no shell quoting.
    pub fn args(&self, request: &DownloadRequest) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{}:{}", self.downloads_path.display(), self.container_dir),
            self.image.clone(),
            "-o".to_string(),
            self.container_dir.clone(),
        ];

        if let Some(range) = request.chapter_range {
            args.push("--start".to_string());
            args.push(range.start().to_string());
            args.push("--end".to_string());
            args.push(range.end().to_string());
        }

        args.push(request.url.clone());
        args
    }
}

#[async_trait]
impl Downloader for ContainerDownloader {
    #[tracing::instrument(skip(self, request), fields(url = %request.url))]
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutput, DownloaderError> {
        let args = self.args(request);
        tracing::info!(program = %self.runtime, args = ?args, "Executing downloader");

        let mut child = Command::new(&self.runtime)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DownloaderError::Launch {
                program: self.runtime.clone(),
                source,
            })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(DownloaderError::Io(std::io::Error::other(
                "downloader output pipes unavailable",
            )));
        };

        let captured = match capture_output(stdout, stderr, self.max_output_bytes).await {
            Ok(captured) => captured,
            Err(e) => {
                if let Err(kill_err) = child.kill().await {
                    tracing::warn!(error = %kill_err, "Failed to kill downloader after output overflow");
                }
                return Err(e);
            }
        };

        let status = child.wait().await?;
        let stdout = String::from_utf8_lossy(&captured.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&captured.stderr).into_owned();

        if !stderr.is_empty() {
            tracing::warn!(stderr = %stderr.trim_end(), "Downloader wrote to stderr");
        }

        if !status.success() {
            return Err(DownloaderError::NonZeroExit {
                code: status.code(),
                stderr: stderr.trim_end().to_string(),
            });
        }

        tracing::debug!(stdout_len = stdout.len(), "Downloader exited successfully");

        Ok(DownloadOutput { stdout, stderr })
    }
}
