use config::{Config, ConfigError, File, Map};
use serde::Deserialize;

use super::Environment;
use crate::infrastructure::downloader::DEFAULT_MAX_OUTPUT_BYTES;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub downloader: DownloaderSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub provider: DatabaseProvider,
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloaderSettings {
    /// Container runtime binary used to launch the image.
    pub runtime: String,
    pub image: String,
    /// Host directory bound into the container.
    pub downloads_path: String,
    pub container_dir: String,
    pub max_output_bytes: usize,
    /// Unset means every job launches its downloader immediately.
    pub max_concurrent_downloads: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Self::from_env_map(environment, std::env::vars().collect())
    }

    /// Layers defaults, `appsettings.<env>`, `APP_*` variables (`__` separates
    /// nested keys) and finally the bare `PORT`, `DOWNLOADS_PATH` and
    /// `DATABASE_URL` variables.
    pub fn from_env_map(
        environment: Environment,
        vars: Map<String, String>,
    ) -> Result<Self, ConfigError> {
        let overrides = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();
        let port = overrides("PORT");
        let downloads_path = overrides("DOWNLOADS_PATH");
        let database_url = overrides("DATABASE_URL");

        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001_i64)?
            .set_default("database.provider", "postgres")?
            .set_default("database.max_connections", 5_i64)?
            .set_default("downloader.runtime", "docker")?
            .set_default("downloader.image", "webtoon-downloader")?
            .set_default("downloader.downloads_path", "/app/downloads")?
            .set_default("downloader.container_dir", "/app/downloads")?
            .set_default("downloader.max_output_bytes", DEFAULT_MAX_OUTPUT_BYTES as i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .add_source(
                File::with_name(&format!(
                    "appsettings.{}",
                    environment.as_str().to_lowercase()
                ))
                .required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .set_override_option("server.port", port)?
            .set_override_option("downloader.downloads_path", downloads_path)?
            .set_override_option("database.url", database_url)?
            .build()?
            .try_deserialize()
    }
}
