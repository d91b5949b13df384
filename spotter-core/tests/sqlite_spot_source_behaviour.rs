//! Behavioural tests for `SqliteSpotSource` using rstest-bdd.

use std::{cell::RefCell, path::PathBuf};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use rusqlite::Connection;
use spotter_core::{
    Coordinate, Rating, Spot, SpotId, SpotSource, SqliteSpotSource, SqliteSpotSourceError,
    persist_spots_to_sqlite,
};
use tempfile::TempDir;
use uuid::Uuid;

/// Shared state for SQLite source scenarios.
#[derive(Debug)]
struct SqliteWorld {
    temp_dir: TempDir,
    dataset: RefCell<Vec<Spot>>,
    open_error: RefCell<Option<SqliteSpotSourceError>>,
    fetched: RefCell<Vec<Spot>>,
}

impl SqliteWorld {
    fn database_path(&self) -> PathBuf {
        self.temp_dir.path().join("spots.db")
    }
}

#[fixture]
fn world() -> SqliteWorld {
    SqliteWorld {
        temp_dir: TempDir::new().expect("create temp dir"),
        dataset: RefCell::new(Vec::new()),
        open_error: RefCell::new(None),
        fetched: RefCell::new(Vec::new()),
    }
}

fn spot(id: u128, name: &str, latitude: f64, longitude: f64) -> Spot {
    let location = Coordinate::new(latitude, longitude).expect("valid coordinate");
    Spot::builder(SpotId::from_uuid(Uuid::from_u128(id)), name, location)
        .rating(Rating::new(4.0).expect("valid rating"))
        .build()
        .expect("valid spot")
}

#[given("a SQLite database with spots in London and Paris")]
fn given_dataset(world: &SqliteWorld) {
    let spots = vec![
        spot(1, "Trafalgar Square", 51.5080, -0.1281),
        spot(2, "Louvre", 48.8566, 2.3522),
        spot(3, "Soho Square", 51.5101, -0.1340),
    ];
    persist_spots_to_sqlite(world.database_path(), &spots).expect("persist spots");
    world.dataset.replace(spots);
}

#[given("a SQLite database without a spots table")]
fn given_database_without_table(world: &SqliteWorld) {
    Connection::open(world.database_path())
        .and_then(|connection| connection.execute_batch("CREATE TABLE pois (id INTEGER)"))
        .expect("create unrelated table");
}

#[given("the first London spot is re-imported with a new name")]
fn given_reimported(world: &SqliteWorld) {
    let mut renamed = world
        .dataset
        .borrow()
        .first()
        .cloned()
        .expect("dataset should be populated");
    renamed.name = String::from("Trafalgar Square (renamed)");
    persist_spots_to_sqlite(world.database_path(), std::slice::from_ref(&renamed))
        .expect("re-persist spot");
    if let Some(first) = world.dataset.borrow_mut().first_mut() {
        *first = renamed;
    }
}

#[when("I open the SQLite spot source")]
fn when_open(world: &SqliteWorld) {
    if let Err(err) = SqliteSpotSource::open(world.database_path()) {
        world.open_error.replace(Some(err));
    }
}

#[when("I fetch candidates within {radius} metres of central London")]
fn when_fetch(world: &SqliteWorld, radius: f64) {
    let source = SqliteSpotSource::open(world.database_path()).expect("open source");
    let centre = Coordinate::new(51.5074, -0.1278).expect("valid centre");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build runtime");
    let fetched = runtime
        .block_on(source.fetch_candidates(centre, radius))
        .expect("fetch candidates");
    world.fetched.replace(fetched);
}

#[then("the London spots are returned in import order")]
fn then_london_spots(world: &SqliteWorld) {
    let names: Vec<String> = world
        .fetched
        .borrow()
        .iter()
        .map(|spot| spot.name.clone())
        .collect();
    assert_eq!(names, ["Trafalgar Square", "Soho Square"]);
}

#[then("opening fails with a missing table error")]
fn then_missing_table(world: &SqliteWorld) {
    let error = world.open_error.borrow();
    assert!(
        matches!(
            error.as_ref(),
            Some(SqliteSpotSourceError::MissingTable { .. })
        ),
        "expected MissingTable, got {error:?}"
    );
}

#[then("the renamed spot is still returned first")]
fn then_renamed_first(world: &SqliteWorld) {
    let fetched = world.fetched.borrow();
    let dataset = world.dataset.borrow();
    assert_eq!(fetched.first(), dataset.first());
    assert_eq!(fetched.len(), 2, "expected both London spots");
}

#[scenario(path = "tests/features/sqlite_spot_source.feature", index = 0)]
fn london_spots_returned(world: SqliteWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_spot_source.feature", index = 1)]
fn missing_table_rejected(world: SqliteWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_spot_source.feature", index = 2)]
fn reimport_updates_in_place(world: SqliteWorld) {
    let _ = world;
}
