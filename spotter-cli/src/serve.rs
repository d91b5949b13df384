//! Serve command implementation for the Spotter CLI.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use spotter_core::SqliteSpotSource;
use tokio::net::TcpListener;

use crate::http::{AppState, build_router};
use crate::{
    ARG_DATABASE, ARG_LISTEN, ARG_REQUEST_TIMEOUT_MS, CliError, ENV_SERVE_DATABASE,
    require_existing_file,
};

/// Address used when `--listen` is not configured.
pub(crate) const DEFAULT_LISTEN: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);

/// Request timeout used when `--request-timeout-ms` is not configured.
pub(crate) const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// CLI arguments for the `serve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Serve spot searches over HTTP. Candidates are read from a \
                 SQLite database populated by `spotter import`; settings can \
                 come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Serve spot searches over HTTP"
)]
#[ortho_config(prefix = "SPOTTER")]
pub(crate) struct ServeArgs {
    /// Path to the SQLite spot database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Socket address to listen on (default 127.0.0.1:8080).
    #[arg(long = ARG_LISTEN, value_name = "addr")]
    #[serde(default)]
    pub(crate) listen: Option<SocketAddr>,
    /// Per-request deadline in milliseconds (default 30000).
    #[arg(long = ARG_REQUEST_TIMEOUT_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) request_timeout_ms: Option<u64>,
}

impl ServeArgs {
    pub(crate) fn into_config(self) -> Result<ServeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ServeConfig::try_from(merged)
    }
}

/// Resolved `serve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServeConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) listen: SocketAddr,
    pub(crate) request_timeout: Duration,
}

impl ServeConfig {
    /// Check that the spot database exists before binding the listener.
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing_file(&self.database, ARG_DATABASE)
    }
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = CliError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_SERVE_DATABASE,
        })?;
        let listen = args.listen.unwrap_or(DEFAULT_LISTEN);
        let request_timeout =
            Duration::from_millis(args.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS));
        Ok(Self {
            database,
            listen,
            request_timeout,
        })
    }
}

pub(crate) fn run_serve(args: ServeArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime.block_on(serve(config))
}

async fn serve(config: ServeConfig) -> Result<(), CliError> {
    let source =
        SqliteSpotSource::open(&config.database).map_err(|source| CliError::OpenSource {
            path: config.database.clone(),
            source,
        })?;
    let state = AppState::new(Arc::new(source), config.request_timeout);
    let app = build_router(Arc::new(state));

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| CliError::Bind {
            address: config.listen,
            source,
        })?;
    tracing::info!(
        address = %config.listen,
        database = %config.database,
        "listening for spot searches"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(CliError::Serve)?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ServeConfig, CliError> {
    let merged = ServeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ServeConfig::try_from(merged)
}
