//! Error types emitted by the Spotter CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::{net::SocketAddr, sync::Arc};

use camino::Utf8PathBuf;

use spotter_core::{PersistSpotsError, QueryError, SqliteSpotSourceError};
use thiserror::Error;

/// Errors emitted by the Spotter CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without the leading dashes.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag naming the path.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag naming the path.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag naming the path.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The configured search parameters do not form a valid query.
    #[error("invalid query: {source}")]
    InvalidQuery {
        /// Underlying failure.
        #[source]
        source: QueryError,
    },
    /// Opening the SQLite spot database failed.
    #[error("failed to open spot database {path:?}: {source}")]
    OpenSource {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: SqliteSpotSourceError,
    },
    /// Running the query failed.
    #[error("query failed: {0}")]
    Query(#[source] QueryError),
    /// Opening the spots import file failed.
    #[error("failed to open spots file at {path:?}: {source}")]
    OpenSpotsFile {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// Spots import JSON could not be decoded.
    #[error("failed to parse spots JSON at {path:?}: {source}")]
    ParseSpotsFile {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
    /// Creating the directory that holds the spot database failed.
    #[error("failed to create parent directory for {path:?}: {source}")]
    CreateDatabaseDir {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// Persisting spots to SQLite failed.
    #[error("failed to persist spots to {path:?}: {source}")]
    PersistSpots {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: PersistSpotsError,
    },
    /// Serialising query results failed.
    #[error("failed to serialise spots: {0}")]
    SerialiseSpots(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Building the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Binding the HTTP listener failed.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Address the listener tried to bind.
        address: SocketAddr,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The HTTP server stopped with an error.
    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),
}
