pub mod downloader;
pub mod observability;
pub mod persistence;
