mod error_response;
mod health;
pub mod job_requests;
mod jobs;

pub use error_response::ErrorResponse;
pub use health::health_handler;
pub use jobs::{
    create_job_handler, delete_job_handler, get_job_handler, list_jobs_handler, stats_handler,
    update_job_handler,
};
