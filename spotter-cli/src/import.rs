//! Import command implementation for the Spotter CLI.

use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use spotter_core::{Spot, persist_spots_to_sqlite};
use spotter_fs::{ensure_parent_dir, open_utf8_file};

use crate::{
    ARG_DATABASE, ARG_IMPORT_INPUT, CliError, ENV_IMPORT_DATABASE, ENV_IMPORT_INPUT,
    require_existing_file,
};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load a JSON array of spots and upsert them into a SQLite \
                 spot database, creating the database and schema when \
                 needed. Each spot carries id, name, website, coordinates \
                 (WKT POINT(lon lat)), description and rating.",
    about = "Import spots from JSON into SQLite"
)]
#[ortho_config(prefix = "SPOTTER")]
pub(crate) struct ImportArgs {
    /// Path to a JSON file containing an array of spots.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Path to the SQLite spot database to write.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) input: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
}

impl ImportConfig {
    /// Check that the input file exists before anything is written.
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing_file(&self.input, ARG_IMPORT_INPUT)
    }
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_IMPORT_INPUT,
            env: ENV_IMPORT_INPUT,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_IMPORT_DATABASE,
        })?;
        Ok(Self { input, database })
    }
}

pub(crate) fn run_import(args: ImportArgs) -> Result<usize, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    import_spots(&config)
}

/// Load the input file and persist its spots, returning how many were written.
pub(crate) fn import_spots(config: &ImportConfig) -> Result<usize, CliError> {
    let spots = load_spots(&config.input)?;
    ensure_parent_dir(&config.database).map_err(|source| CliError::CreateDatabaseDir {
        path: config.database.clone(),
        source,
    })?;
    let written = persist_spots_to_sqlite(&config.database, &spots).map_err(|source| {
        CliError::PersistSpots {
            path: config.database.clone(),
            source,
        }
    })?;
    tracing::info!(
        count = written,
        database = %config.database,
        "imported spots"
    );
    Ok(written)
}

/// Loads a JSON array of [`Spot`] values from disk.
pub(crate) fn load_spots(path: &Utf8Path) -> Result<Vec<Spot>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenSpotsFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseSpotsFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ImportConfig, CliError> {
    let merged = ImportArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ImportConfig::try_from(merged)
}
