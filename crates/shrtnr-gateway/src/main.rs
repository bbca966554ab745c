use anyhow::Context;
use clap::Parser;
use shrtnr_core::{Repository, Shortener};
use shrtnr_gateway::cli::{Cli, StorageBackendArg};
use shrtnr_gateway::{telemetry, App, AppState};
use shrtnr_generator::{SqidsGenerator, SqidsSettings};
use shrtnr_shortener::{RetryPolicy, ShortenerService};
use shrtnr_storage::{InMemoryRepository, RedbRepository};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format);

    info!(
        root_url = %cli.root_url(),
        db_path = %cli.db_path.display(),
        storage_backend = %cli.storage,
        use_domain_tag = cli.use_domain_tag,
        "starting shrtnr"
    );

    let shortener = match cli.storage {
        StorageBackendArg::Redb => {
            let repository = RedbRepository::open(&cli.db_path).with_context(|| {
                format!("failed to open store at {}", cli.db_path.display())
            })?;
            build_shortener(repository, &cli)?
        }
        StorageBackendArg::InMemory => build_shortener(InMemoryRepository::new(), &cli)?,
    };

    let state = AppState::new(shortener, cli.root_url(), cli.use_domain_tag);

    let listener = tokio::net::TcpListener::bind(cli.listen_addr())
        .await
        .with_context(|| format!("failed to bind {}", cli.listen_addr()))?;
    info!(listen_addr = %listener.local_addr()?, "starting http server");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    info!("shrtnr stopped");
    Ok(())
}

fn build_shortener<R: Repository>(
    repository: R,
    cli: &Cli,
) -> anyhow::Result<Arc<dyn Shortener>> {
    let generator = SqidsGenerator::new(SqidsSettings::default())
        .context("failed to build short code generator")?;
    let retry = RetryPolicy::builder().max_attempts(cli.max_attempts).build();

    Ok(Arc::new(
        ShortenerService::new(repository, generator).with_retry_policy(retry),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
