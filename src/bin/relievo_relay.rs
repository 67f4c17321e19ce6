//! Standalone upload relay binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use relievo::core::RelievoError;
use relievo::relay::{self, HttpUpstream, RelayConfig, RelayService};

#[derive(Debug, Parser)]
#[command(name = "relievo-relay", about = "Upload relay for shared images")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "RELIEVO_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overriding the configuration file.
    #[arg(long, env = "RELIEVO_RELAY_BIND")]
    bind: Option<String>,

    /// Allowed Origin header value, overriding the configuration file.
    #[arg(long, env = "RELIEVO_RELAY_ORIGIN")]
    allowed_origin: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), RelievoError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relievo=info,relievo_relay=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RelayConfig::load(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(origin) = cli.allowed_origin {
        config.allowed_origin = origin;
    }

    let bind = config.bind.clone();
    let upstream = Arc::new(HttpUpstream::new(config.upstream_url.clone()));
    let service = Arc::new(RelayService::new(config, upstream));
    let app = relay::http::router(service);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(%bind, "relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
