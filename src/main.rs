use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use webtoon_jobs::application::services::{DownloadExecutor, JobService};
use webtoon_jobs::infrastructure::downloader::ContainerDownloader;
use webtoon_jobs::infrastructure::observability::{TracingConfig, init_tracing};
use webtoon_jobs::infrastructure::persistence::JobRepositoryFactory;
use webtoon_jobs::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    init_tracing(
        TracingConfig::from_settings(&settings.logging, environment),
        settings.server.port,
    );

    let job_repository = JobRepositoryFactory::create(&settings.database).await?;
    let downloader = Arc::new(ContainerDownloader::new(&settings.downloader));
    let executor = Arc::new(DownloadExecutor::new(
        Arc::clone(&job_repository),
        downloader,
        settings.downloader.max_concurrent_downloads,
    ));

    tracing::info!(
        runtime = %settings.downloader.runtime,
        image = %settings.downloader.image,
        downloads_path = %settings.downloader.downloads_path,
        max_concurrent_downloads = ?executor.max_concurrent_downloads(),
        "Downloader configured"
    );

    let job_service = Arc::new(JobService::new(Arc::clone(&job_repository), executor));
    let router = create_router(AppState { job_service });

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    job_repository.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
