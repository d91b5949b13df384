//! Query command implementation for the Spotter CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use spotter_core::{
    Coordinate, QueryError, RegionKind, RegionQuery, Spot, SpotQueryService, SqliteSpotSource,
};
use tokio_util::sync::CancellationToken;

use crate::{
    ARG_DATABASE, ARG_LATITUDE, ARG_LONGITUDE, ARG_RADIUS, ARG_REGION_TYPE, CliError,
    ENV_QUERY_DATABASE, ENV_QUERY_LATITUDE, ENV_QUERY_LONGITUDE, ENV_QUERY_RADIUS,
    current_thread_runtime, require_existing_file,
};

/// CLI arguments for the `query` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Run one spot search against a SQLite spot database and \
                 print the ranked results as a JSON array, encoded exactly as \
                 the HTTP endpoint encodes them.",
    about = "Run a single spot search"
)]
#[ortho_config(prefix = "SPOTTER")]
pub(crate) struct QueryArgs {
    /// Path to the SQLite spot database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Centre latitude in degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Centre longitude in degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Search radius in metres.
    #[arg(long = ARG_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
    /// Region shape: `circle` (default) or `square`.
    #[arg(long = ARG_REGION_TYPE, value_name = "kind")]
    #[serde(default)]
    pub(crate) region_type: Option<String>,
}

impl QueryArgs {
    pub(crate) fn into_config(self) -> Result<QueryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        QueryConfig::try_from(merged)
    }
}

/// Resolved `query` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QueryConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) query: RegionQuery,
}

impl QueryConfig {
    /// Check that the spot database exists before opening it.
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing_file(&self.database, ARG_DATABASE)
    }
}

impl TryFrom<QueryArgs> for QueryConfig {
    type Error = CliError;

    fn try_from(args: QueryArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_QUERY_DATABASE,
        })?;
        let latitude = args.latitude.ok_or(CliError::MissingArgument {
            field: ARG_LATITUDE,
            env: ENV_QUERY_LATITUDE,
        })?;
        let longitude = args.longitude.ok_or(CliError::MissingArgument {
            field: ARG_LONGITUDE,
            env: ENV_QUERY_LONGITUDE,
        })?;
        let radius = args.radius.ok_or(CliError::MissingArgument {
            field: ARG_RADIUS,
            env: ENV_QUERY_RADIUS,
        })?;
        let query = build_query(latitude, longitude, radius, args.region_type.as_deref())
            .map_err(|source| CliError::InvalidQuery { source })?;
        Ok(Self { database, query })
    }
}

fn build_query(
    latitude: f64,
    longitude: f64,
    radius: f64,
    region_type: Option<&str>,
) -> Result<RegionQuery, QueryError> {
    let center = Coordinate::new(latitude, longitude)?;
    let kind = region_type.map_or(Ok(RegionKind::default()), str::parse)?;
    RegionQuery::new(center, radius, kind)
}

pub(crate) fn run_query(args: QueryArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    run_query_with(&config, writer)
}

pub(crate) fn run_query_with(config: &QueryConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let source =
        SqliteSpotSource::open(&config.database).map_err(|source| CliError::OpenSource {
            path: config.database.clone(),
            source,
        })?;
    let service = SpotQueryService::new(source);
    let runtime = current_thread_runtime()?;
    let spots = runtime
        .block_on(service.query(&config.query, &CancellationToken::new()))
        .map_err(CliError::Query)?;
    tracing::debug!(count = spots.len(), "query returned spots");
    write_spots(writer, &spots)
}

fn write_spots(writer: &mut dyn Write, spots: &[Spot]) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(spots).map_err(CliError::SerialiseSpots)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<QueryConfig, CliError> {
    let merged = QueryArgs::merge_from_layers(layers).map_err(CliError::from)?;
    QueryConfig::try_from(merged)
}
