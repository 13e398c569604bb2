use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::TempDir;
use webtoon_jobs::application::ports::{DownloadRequest, Downloader, DownloaderError};
use webtoon_jobs::domain::ChapterRange;
use webtoon_jobs::infrastructure::downloader::ContainerDownloader;
use webtoon_jobs::presentation::config::DownloaderSettings;

// Writing an executable while another test forks can fail with ETXTBSY.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

fn settings(runtime: &str, max_output_bytes: usize) -> DownloaderSettings {
    DownloaderSettings {
        runtime: runtime.to_string(),
        image: "webtoon-downloader".to_string(),
        downloads_path: "/srv/webtoons".to_string(),
        container_dir: "/app/downloads".to_string(),
        max_output_bytes,
        max_concurrent_downloads: None,
    }
}

fn write_runtime(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("fake-runtime");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn request(range: Option<ChapterRange>) -> DownloadRequest {
    DownloadRequest {
        url: "https://example.com/comic?title_no=1".to_string(),
        chapter_range: range,
    }
}

#[test]
fn given_chapter_range_when_building_args_then_range_flags_precede_url() {
    let downloader = ContainerDownloader::new(&settings("docker", 1024));

    let args = downloader.args(&request(ChapterRange::from_bounds(Some(1), Some(5))));

    assert_eq!(downloader.program(), "docker");
    assert_eq!(
        args,
        vec![
            "run",
            "--rm",
            "-v",
            "/srv/webtoons:/app/downloads",
            "webtoon-downloader",
            "-o",
            "/app/downloads",
            "--start",
            "1",
            "--end",
            "5",
            "https://example.com/comic?title_no=1",
        ]
    );
}

#[test]
fn given_no_chapter_range_when_building_args_then_url_follows_output_dir() {
    let downloader = ContainerDownloader::new(&settings("docker", 1024));

    let args = downloader.args(&request(None));

    assert!(!args.iter().any(|a| a == "--start" || a == "--end"));
    assert_eq!(args.last().unwrap(), "https://example.com/comic?title_no=1");
    assert_eq!(args[args.len() - 2], "/app/downloads");
}

#[tokio::test]
async fn given_runtime_exits_zero_when_downloading_then_stdout_is_returned() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let runtime = write_runtime(&dir, r#"printf '%s\n' "$@""#);
    let downloader = ContainerDownloader::new(&settings(runtime.to_str().unwrap(), 1024));

    let output = downloader
        .download(&request(ChapterRange::from_bounds(Some(2), Some(3))))
        .await
        .unwrap();

    let lines: Vec<&str> = output.stdout.lines().collect();
    assert_eq!(lines.first(), Some(&"run"));
    assert_eq!(lines.last(), Some(&"https://example.com/comic?title_no=1"));
    assert!(lines.contains(&"--start"));
    assert!(output.stderr.is_empty());
}

#[tokio::test]
async fn given_runtime_writes_stderr_but_exits_zero_when_downloading_then_success() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let runtime = write_runtime(&dir, "echo 'slow mirror' >&2\nexit 0");
    let downloader = ContainerDownloader::new(&settings(runtime.to_str().unwrap(), 1024));

    let output = downloader.download(&request(None)).await.unwrap();

    assert_eq!(output.stderr, "slow mirror\n");
}

#[tokio::test]
async fn given_runtime_exits_nonzero_when_downloading_then_exit_code_and_stderr_reported() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let runtime = write_runtime(&dir, "echo 'series not found' >&2\nexit 3");
    let downloader = ContainerDownloader::new(&settings(runtime.to_str().unwrap(), 1024));

    let err = downloader.download(&request(None)).await.unwrap_err();

    match &err {
        DownloaderError::NonZeroExit { code, stderr } => {
            assert_eq!(*code, Some(3));
            assert_eq!(stderr, "series not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("exit code 3"));
}

#[tokio::test]
async fn given_missing_runtime_when_downloading_then_launch_error() {
    let downloader =
        ContainerDownloader::new(&settings("/nonexistent/webtoon-runtime", 1024));

    let err = downloader.download(&request(None)).await.unwrap_err();

    assert!(matches!(err, DownloaderError::Launch { .. }));
    assert!(err.to_string().contains("/nonexistent/webtoon-runtime"));
}

#[tokio::test]
async fn given_runtime_floods_output_when_downloading_then_output_limit_exceeded() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let runtime = write_runtime(&dir, "head -c 200000 /dev/zero");
    let downloader = ContainerDownloader::new(&settings(runtime.to_str().unwrap(), 1024));

    let err = downloader.download(&request(None)).await.unwrap_err();

    assert!(matches!(
        err,
        DownloaderError::OutputLimitExceeded { limit: 1024 }
    ));
}
