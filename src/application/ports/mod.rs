mod downloader;
mod job_repository;
mod repository_error;

pub use downloader::{DownloadOutput, DownloadRequest, Downloader, DownloaderError};
pub use job_repository::JobRepository;
pub use repository_error::RepositoryError;
