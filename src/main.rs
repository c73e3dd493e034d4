// docrelay - PDF document translation relay

use anyhow::{Context, Result};
use clap::Parser;
use docrelay::cli::Args;
use docrelay::config::AppConfig;
use docrelay::engines::Engines;
use docrelay::server::{create_router, FlashKey};
use docrelay::storage::FileStore;
use docrelay::utils::logging;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    if args.print_config {
        print!("{}", toml::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting docrelay v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Prepare storage
    let store = FileStore::new(&config.storage);
    store
        .ensure_dirs()
        .await
        .context("failed to create upload/download directories")?;
    info!(
        "Uploads in {}, results in {}",
        store.upload_dir().display(),
        store.download_dir().display()
    );

    // Phase 4: Build vendor clients from whatever credentials are present
    let engines = Engines::from_config(&config)?;
    if engines.configured().is_empty() {
        warn!("No translation engine is configured; every submission will be rejected");
    }

    // Phase 5: Build and start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid listen address")?;
    let app = create_router(config, engines, store, FlashKey::generate()?)?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
