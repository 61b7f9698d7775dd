//! Reconciliation daemon for tenant custom domains.
//!
//! Loads configuration from the environment, opens the store and runs the
//! reconciliation scheduler until Ctrl-C.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use custom_domain_app::adapters::InMemoryDomainConfigRepository;
use custom_domain_app::{AppConfig, AppStateBuilder};
use custom_domain_core::traits::DomainConfigRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        "Starting custom domain reconciler (project {}, email {})",
        config.hosting.project_id,
        if config.email.is_some() { "enabled" } else { "disabled" }
    );

    let repository = open_repository(&config).await?;
    let state = AppStateBuilder::from_config(&config)
        .context("failed to create provider clients")?
        .repository(repository)
        .build()?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = state.scheduler().spawn(shutdown_rx);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutdown requested");

    if let Err(e) = shutdown_tx.send(true) {
        tracing::error!("Failed to send shutdown signal: {e}");
    }
    handle.await.context("scheduler task panicked")?;

    Ok(())
}

#[cfg(feature = "sqlite-store")]
async fn open_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn DomainConfigRepository>> {
    if let Some(path) = &config.db_path {
        let store = custom_domain_app::adapters::SqliteStore::new(path)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;
        return Ok(Arc::new(store));
    }
    tracing::warn!("CUSTOM_DOMAIN_DB_PATH not set, using in-memory storage");
    Ok(Arc::new(InMemoryDomainConfigRepository::new()))
}

#[cfg(not(feature = "sqlite-store"))]
async fn open_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn DomainConfigRepository>> {
    if config.db_path.is_some() {
        anyhow::bail!("CUSTOM_DOMAIN_DB_PATH is set but the sqlite-store feature is disabled");
    }
    tracing::warn!("Using in-memory storage");
    Ok(Arc::new(InMemoryDomainConfigRepository::new()))
}
