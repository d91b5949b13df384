//! Command-line interface and HTTP boundary for the Spotter search service.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use clap::{Parser, Subcommand};

pub mod http;

mod error;
mod import;
mod query;
mod serve;

pub use error::CliError;

use import::{ImportArgs, run_import};
use query::{QueryArgs, run_query};
use serve::{ServeArgs, run_serve};

const ARG_DATABASE: &str = "database";
const ARG_IMPORT_INPUT: &str = "input";
const ARG_LATITUDE: &str = "latitude";
const ARG_LISTEN: &str = "listen";
const ARG_LONGITUDE: &str = "longitude";
const ARG_RADIUS: &str = "radius";
const ARG_REGION_TYPE: &str = "type";
const ARG_REQUEST_TIMEOUT_MS: &str = "request-timeout-ms";
const ENV_IMPORT_DATABASE: &str = "SPOTTER_CMDS_IMPORT_DATABASE";
const ENV_IMPORT_INPUT: &str = "SPOTTER_CMDS_IMPORT_INPUT";
const ENV_QUERY_DATABASE: &str = "SPOTTER_CMDS_QUERY_DATABASE";
const ENV_QUERY_LATITUDE: &str = "SPOTTER_CMDS_QUERY_LATITUDE";
const ENV_QUERY_LONGITUDE: &str = "SPOTTER_CMDS_QUERY_LONGITUDE";
const ENV_QUERY_RADIUS: &str = "SPOTTER_CMDS_QUERY_RADIUS";
const ENV_SERVE_DATABASE: &str = "SPOTTER_CMDS_SERVE_DATABASE";

/// Run the Spotter CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Serve(args) => run_serve(args),
        Command::Query(args) => {
            let mut stdout = std::io::stdout().lock();
            run_query(args, &mut stdout)
        }
        Command::Import(args) => run_import(args).map(|_| ()),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "spotter",
    about = "Search for spots around a point and serve the search over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve `GET /spots` over HTTP from a SQLite spot database.
    Serve(ServeArgs),
    /// Run a single search and print the ranked spots as JSON.
    Query(QueryArgs),
    /// Load spots from a JSON file into a SQLite spot database.
    Import(ImportArgs),
}

/// Build a current-thread runtime for one-shot commands.
fn current_thread_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)
}

/// Fail unless `path` names an existing regular file.
fn require_existing_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match spotter_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
