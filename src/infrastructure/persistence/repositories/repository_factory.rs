use std::sync::Arc;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::presentation::config::{DatabaseProvider, DatabaseSettings};

use super::in_memory_job_repository::InMemoryJobRepository;
use super::pg_job_repository::PgJobRepository;
use crate::infrastructure::persistence::{create_pool, run_migrations};

pub struct JobRepositoryFactory;

impl JobRepositoryFactory {
    pub async fn create(
        settings: &DatabaseSettings,
    ) -> Result<Arc<dyn JobRepository>, RepositoryError> {
        match settings.provider {
            DatabaseProvider::Postgres => {
                let url = settings.url.as_deref().ok_or_else(|| {
                    RepositoryError::ConnectionFailed("database.url required".into())
                })?;
                let pool = create_pool(url, settings.max_connections).await?;
                run_migrations(&pool).await?;
                Ok(Arc::new(PgJobRepository::new(pool)))
            }
            DatabaseProvider::Memory => {
                tracing::warn!("Using in-memory job store; jobs are lost on restart");
                Ok(Arc::new(InMemoryJobRepository::new()))
            }
        }
    }
}
