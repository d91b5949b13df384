//! Focused unit tests covering CLI configuration and command execution.

use super::helpers::{LONDON_SPOTS_JSON, TRAFALGAR, names_in_output, utf8_root, write_file};
use super::*;
use crate::import::{ImportConfig, import_spots, load_spots, run_import};
use crate::query::{QueryConfig, run_query_with};
use crate::serve::{DEFAULT_LISTEN, ServeConfig};
use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;
use spotter_core::{QueryError, RegionKind};
use std::time::Duration;
use tempfile::TempDir;

fn query_args() -> QueryArgs {
    QueryArgs {
        database: Some(Utf8PathBuf::from("spots.db")),
        latitude: Some(TRAFALGAR.0),
        longitude: Some(TRAFALGAR.1),
        radius: Some(1_000.0),
        region_type: None,
    }
}

#[rstest]
fn converting_serve_without_database_errors() {
    let err = ServeConfig::try_from(ServeArgs::default()).expect_err("missing database");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_DATABASE);
            assert_eq!(env, ENV_SERVE_DATABASE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn serve_config_applies_defaults() {
    let args = ServeArgs {
        database: Some(Utf8PathBuf::from("spots.db")),
        ..ServeArgs::default()
    };
    let config = ServeConfig::try_from(args).expect("config should build");
    assert_eq!(config.listen, DEFAULT_LISTEN);
    assert_eq!(config.listen.to_string(), "127.0.0.1:8080");
    assert_eq!(config.request_timeout, Duration::from_secs(30));
}

#[rstest]
#[case::database(ARG_DATABASE, ENV_QUERY_DATABASE)]
#[case::latitude(ARG_LATITUDE, ENV_QUERY_LATITUDE)]
#[case::longitude(ARG_LONGITUDE, ENV_QUERY_LONGITUDE)]
#[case::radius(ARG_RADIUS, ENV_QUERY_RADIUS)]
fn converting_query_without_required_fields_errors(
    #[case] missing: &'static str,
    #[case] env_var: &'static str,
) {
    let mut args = query_args();
    match missing {
        ARG_DATABASE => args.database = None,
        ARG_LATITUDE => args.latitude = None,
        ARG_LONGITUDE => args.longitude = None,
        _ => args.radius = None,
    }
    let err = QueryConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, missing);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case::unknown_kind(QueryArgs { region_type: Some(String::from("hexagon")), ..query_args() })]
#[case::latitude_out_of_range(QueryArgs { latitude: Some(95.0), ..query_args() })]
#[case::zero_radius(QueryArgs { radius: Some(0.0), ..query_args() })]
fn converting_invalid_query_errors(#[case] args: QueryArgs) {
    let err = QueryConfig::try_from(args).expect_err("invalid query should error");
    match err {
        CliError::InvalidQuery {
            source: QueryError::InvalidArgument(_),
        } => {}
        other => panic!("expected InvalidQuery, found {other:?}"),
    }
}

#[rstest]
fn query_command_accepts_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "spotter",
        "query",
        "--database",
        "spots.db",
        "--latitude",
        "-33.8688",
        "--longitude",
        "-70.6693",
        "--radius",
        "250",
        "--type",
        "square",
    ])
    .expect("arguments should parse");
    let Command::Query(args) = cli.command else {
        panic!("expected the query subcommand");
    };
    let config = QueryConfig::try_from(args).expect("config should build");
    assert_eq!(config.query.kind(), RegionKind::BoundingBox);
    assert_eq!(config.query.center().latitude(), -33.8688);
    assert_eq!(config.query.center().longitude(), -70.6693);
}

#[rstest]
#[case::input(ImportArgs { input: None, database: Some(Utf8PathBuf::from("spots.db")) }, ARG_IMPORT_INPUT, ENV_IMPORT_INPUT)]
#[case::database(ImportArgs { input: Some(Utf8PathBuf::from("spots.json")), database: None }, ARG_DATABASE, ENV_IMPORT_DATABASE)]
fn converting_import_without_required_fields_errors(
    #[case] args: ImportArgs,
    #[case] expected_field: &'static str,
    #[case] expected_env: &'static str,
) {
    let err = ImportConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "request_timeout_ms": "soon" }));

    let err = crate::serve::config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn serve_layers_honour_precedence() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "database": "from-file.db",
            "listen": "0.0.0.0:9000",
            "request_timeout_ms": 1_000,
        }),
        None,
    );
    composer.push_environment(json!({
        "database": "from-env.db",
        "request_timeout_ms": 2_500,
    }));
    composer.push_cli(json!({ "database": "from-cli.db" }));

    let config = crate::serve::config_from_layers_for_test(composer.layers())
        .expect("merged config should build");
    assert_eq!(config.database, Utf8PathBuf::from("from-cli.db"));
    assert_eq!(config.listen.to_string(), "0.0.0.0:9000");
    assert_eq!(config.request_timeout, Duration::from_millis(2_500));
}

#[rstest]
fn query_layers_fill_missing_cli_values() {
    let mut composer = MergeComposer::new();
    composer.push_environment(json!({
        "database": "from-env.db",
        "latitude": TRAFALGAR.0,
        "longitude": TRAFALGAR.1,
    }));
    composer.push_cli(json!({ "radius": 750.0, "region_type": "square" }));

    let config = crate::query::config_from_layers_for_test(composer.layers())
        .expect("merged config should build");
    assert_eq!(config.database, Utf8PathBuf::from("from-env.db"));
    assert_eq!(config.query.radius_metres(), 750.0);
    assert_eq!(config.query.kind(), RegionKind::BoundingBox);
}

#[rstest]
fn import_layers_take_database_from_file() {
    let mut composer = MergeComposer::new();
    composer.push_file(json!({ "database": "from-file.db" }), None);
    composer.push_cli(json!({ "input": "spots.json" }));

    let config = crate::import::config_from_layers_for_test(composer.layers())
        .expect("merged config should build");
    assert_eq!(config.input, Utf8PathBuf::from("spots.json"));
    assert_eq!(config.database, Utf8PathBuf::from("from-file.db"));
}

#[rstest]
fn load_spots_reports_missing_file() {
    let tmp = TempDir::new().expect("tempdir");
    let path = utf8_root(&tmp).join("missing.json");
    let err = load_spots(&path).expect_err("missing file should error");
    match err {
        CliError::OpenSpotsFile { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected OpenSpotsFile, found {other:?}"),
    }
}

#[rstest]
#[case::not_json("not json")]
#[case::rating_out_of_range(
    r#"[{"id": "00000000-0000-0000-0000-000000000001", "name": "x", "coordinates": "POINT(0 0)", "rating": 7}]"#
)]
#[case::bad_coordinates(
    r#"[{"id": "00000000-0000-0000-0000-000000000001", "name": "x", "coordinates": "POINT(0 95)", "rating": 1}]"#
)]
fn load_spots_reports_malformed_json(#[case] contents: &str) {
    let tmp = TempDir::new().expect("tempdir");
    let path = utf8_root(&tmp).join("spots.json");
    write_file(&path, contents);
    let err = load_spots(&path).expect_err("malformed file should error");
    match err {
        CliError::ParseSpotsFile { .. } => {}
        other => panic!("expected ParseSpotsFile, found {other:?}"),
    }
}

#[rstest]
fn imported_spots_are_queryable() {
    let tmp = TempDir::new().expect("tempdir");
    let root = utf8_root(&tmp);
    let input = root.join("spots.json");
    let database = root.join("spots.db");
    write_file(&input, LONDON_SPOTS_JSON);

    let written = import_spots(&ImportConfig {
        input,
        database: database.clone(),
    })
    .expect("import should succeed");
    assert_eq!(written, 4);

    let config = QueryConfig::try_from(QueryArgs {
        database: Some(database),
        ..query_args()
    })
    .expect("config should build");
    let mut output = Vec::new();
    run_query_with(&config, &mut output).expect("query should succeed");
    assert_eq!(names_in_output(&output), ["Gallery", "Fountain", "Theatre"]);
}

#[rstest]
fn query_against_missing_database_errors() {
    let tmp = TempDir::new().expect("tempdir");
    let config = QueryConfig::try_from(QueryArgs {
        database: Some(utf8_root(&tmp).join("absent.db")),
        ..query_args()
    })
    .expect("config should build");
    let err = run_query_with(&config, &mut Vec::new()).expect_err("missing database");
    match err {
        CliError::OpenSource { .. } => {}
        other => panic!("expected OpenSource, found {other:?}"),
    }
}

#[rstest]
fn query_validation_reports_missing_database() {
    let tmp = TempDir::new().expect("tempdir");
    let database = utf8_root(&tmp).join("absent.db");
    let config = QueryConfig::try_from(QueryArgs {
        database: Some(database.clone()),
        ..query_args()
    })
    .expect("config should build");
    match config.validate_sources().expect_err("missing database") {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_DATABASE);
            assert_eq!(path, database);
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn serve_validation_rejects_directories() {
    let tmp = TempDir::new().expect("tempdir");
    let config = ServeConfig::try_from(ServeArgs {
        database: Some(utf8_root(&tmp)),
        ..ServeArgs::default()
    })
    .expect("config should build");
    match config.validate_sources().expect_err("directory is not a database") {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_DATABASE),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn import_validation_reports_missing_input() {
    let tmp = TempDir::new().expect("tempdir");
    let root = utf8_root(&tmp);
    let args = ImportArgs {
        input: Some(root.join("absent.json")),
        database: Some(root.join("spots.db")),
    };
    match run_import(args).expect_err("missing input") {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_IMPORT_INPUT),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
    assert!(!root.join("spots.db").exists());
}

#[rstest]
fn import_creates_missing_database_directories() {
    let tmp = TempDir::new().expect("tempdir");
    let root = utf8_root(&tmp);
    let input = root.join("spots.json");
    write_file(&input, LONDON_SPOTS_JSON);
    let database = root.join("data/london/spots.db");

    let written = import_spots(&ImportConfig {
        input,
        database: database.clone(),
    })
    .expect("import should succeed");
    assert_eq!(written, 4);
    assert!(database.is_file());
}
