use tokio::io::{AsyncRead, AsyncReadExt};

use crate::application::ports::DownloaderError;

/// Default cap on combined stdout and stderr: 10 MiB.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Reads both streams to EOF concurrently. Fails as soon as either stream,
/// or both together, exceed `limit`; output is never truncated.
pub async fn capture_output<O, E>(
    stdout: O,
    stderr: E,
    limit: usize,
) -> Result<CapturedOutput, DownloaderError>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let (stdout, stderr) = tokio::try_join!(read_capped(stdout, limit), read_capped(stderr, limit))?;

    if stdout.len() + stderr.len() > limit {
        return Err(DownloaderError::OutputLimitExceeded { limit });
    }

    Ok(CapturedOutput { stdout, stderr })
}

async fn read_capped<R>(reader: R, limit: usize) -> Result<Vec<u8>, DownloaderError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut limited = reader.take(limit as u64 + 1);
    limited.read_to_end(&mut buf).await?;

    if buf.len() > limit {
        return Err(DownloaderError::OutputLimitExceeded { limit });
    }

    Ok(buf)
}
