use webtoon_jobs::application::ports::DownloaderError;
use webtoon_jobs::infrastructure::downloader::{DEFAULT_MAX_OUTPUT_BYTES, capture_output};

#[test]
fn given_default_limit_then_it_is_ten_mebibytes() {
    assert_eq!(DEFAULT_MAX_OUTPUT_BYTES, 10 * 1024 * 1024);
}

#[tokio::test]
async fn given_output_within_limit_when_capturing_then_both_streams_are_kept() {
    let stdout: &[u8] = b"chapter 1 saved\n";
    let stderr: &[u8] = b"retrying mirror\n";

    let captured = capture_output(stdout, stderr, 64).await.unwrap();

    assert_eq!(captured.stdout, b"chapter 1 saved\n");
    assert_eq!(captured.stderr, b"retrying mirror\n");
}

#[tokio::test]
async fn given_output_exactly_at_limit_when_capturing_then_accepted() {
    let stdout = vec![b'a'; 6];
    let stderr = vec![b'b'; 4];

    let captured = capture_output(stdout.as_slice(), stderr.as_slice(), 10)
        .await
        .unwrap();

    assert_eq!(captured.stdout.len() + captured.stderr.len(), 10);
}

#[tokio::test]
async fn given_one_stream_over_limit_when_capturing_then_hard_failure() {
    let stdout = vec![b'a'; 11];
    let stderr: &[u8] = b"";

    let result = capture_output(stdout.as_slice(), stderr, 10).await;

    assert!(matches!(
        result,
        Err(DownloaderError::OutputLimitExceeded { limit: 10 })
    ));
}

#[tokio::test]
async fn given_streams_over_limit_only_combined_when_capturing_then_hard_failure() {
    let stdout = vec![b'a'; 6];
    let stderr = vec![b'b'; 6];

    let result = capture_output(stdout.as_slice(), stderr.as_slice(), 10).await;

    assert!(matches!(
        result,
        Err(DownloaderError::OutputLimitExceeded { limit: 10 })
    ));
}
