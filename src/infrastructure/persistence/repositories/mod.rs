mod in_memory_job_repository;
mod pg_job_repository;
mod repository_factory;

pub use in_memory_job_repository::InMemoryJobRepository;
pub use pg_job_repository::PgJobRepository;
pub use repository_factory::JobRepositoryFactory;
