mod bounded_output;
mod container_downloader;

pub use bounded_output::{CapturedOutput, DEFAULT_MAX_OUTPUT_BYTES, capture_output};
pub use container_downloader::ContainerDownloader;
