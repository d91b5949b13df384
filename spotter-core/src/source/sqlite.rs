//! SQLite-backed candidate source and the import helper that populates it.

use std::{
    error::Error as StdError,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use geo::Rect;
use rusqlite::{Connection, OpenFlags, Row, params};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{Coordinate, Rating, Spot, SpotId, candidate_envelope};

use super::{SourceError, SpotSource};

const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS spots (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        website TEXT,
        lat REAL NOT NULL,
        lon REAL NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        rating REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS spots_lat_lon ON spots (lat, lon);
";

const SELECT_IN_ENVELOPE: &str = "
    SELECT id, name, website, lat, lon, description, rating
    FROM spots
    WHERE lat BETWEEN ?1 AND ?2 AND lon BETWEEN ?3 AND ?4
    ORDER BY rowid
";

const UPSERT_SPOT: &str = "
    INSERT INTO spots (id, name, website, lat, lon, description, rating)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT (id) DO UPDATE SET
        name = excluded.name,
        website = excluded.website,
        lat = excluded.lat,
        lon = excluded.lon,
        description = excluded.description,
        rating = excluded.rating
";

/// How often an abandoned read is re-interrupted until it notices.
const INTERRUPT_RETRY: Duration = Duration::from_millis(10);

/// Error raised when reading spots from SQLite.
#[derive(Debug, Error)]
pub enum SqliteSpotSourceError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database does not hold a readable `spots` table.
    #[error("SQLite database at {path} has no usable spots table: {source}")]
    MissingTable {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored row could not be turned into a [`Spot`].
    #[error("stored spot {id} is invalid: {source}")]
    InvalidRow {
        /// Identifier column of the offending row.
        id: String,
        /// Validation failure.
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
    /// The read was abandoned by its caller and interrupted.
    #[error("SQLite read was interrupted")]
    Interrupted,
    /// The blocking read task panicked or was aborted.
    #[error("SQLite read task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    /// Generic SQLite error when reading spot rows.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

impl From<SqliteSpotSourceError> for SourceError {
    fn from(value: SqliteSpotSourceError) -> Self {
        Self::new(value)
    }
}

/// Read-only [`SpotSource`] over a SQLite `spots` table.
///
/// Each fetch opens its own read-only connection on the blocking thread
/// pool, so the source is cheap to share between concurrent queries.
/// Dropping a fetch future interrupts its SQLite statement so the blocking
/// thread is released promptly.
///
/// # Examples
/// ```
/// use spotter_core::{Coordinate, Spot, SpotId, SqliteSpotSource, persist_spots_to_sqlite};
///
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("spots.db");
/// let spot = Spot::builder(SpotId::random(), "Plaza", Coordinate::new(0.0, 0.0)?).build()?;
/// persist_spots_to_sqlite(&path, &[spot])?;
///
/// let source = SqliteSpotSource::open(&path)?;
/// assert_eq!(source.path(), path.as_path());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct SqliteSpotSource {
    path: PathBuf,
}

impl SqliteSpotSource {
    /// Open a source backed by the database at `path`.
    ///
    /// The database must already contain a `spots` table, for example one
    /// written by [`persist_spots_to_sqlite`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteSpotSourceError> {
        let db_path = path.as_ref().to_path_buf();
        let connection = open_read_only(&db_path)?;
        connection
            .prepare(SELECT_IN_ENVELOPE)
            .map_err(|source| SqliteSpotSourceError::MissingTable {
                path: db_path.clone(),
                source,
            })?;
        Ok(Self { path: db_path })
    }

    /// Location of the backing database.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SpotSource for SqliteSpotSource {
    async fn fetch_candidates(
        &self,
        center: Coordinate,
        radius_metres: f64,
    ) -> Result<Vec<Spot>, SourceError> {
        let path = self.path.clone();
        let envelope = candidate_envelope(center, radius_metres);
        let cancel = CancellationToken::new();
        let _interrupt_on_drop = cancel.clone().drop_guard();
        let runtime = Handle::current();
        let spots = tokio::task::spawn_blocking(move || {
            let connection = open_read_only(&path)?;
            interruptible(&runtime, &connection, &cancel, |conn| {
                load_candidates(conn, envelope)
            })
        })
        .await
        .map_err(SqliteSpotSourceError::from)??;
        log::trace!(
            "loaded {count} candidate spots from {path}",
            count = spots.len(),
            path = self.path.display()
        );
        Ok(spots)
    }
}

fn open_read_only(path: &Path) -> Result<Connection, SqliteSpotSourceError> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(|source| {
        SqliteSpotSourceError::OpenDatabase {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Run `read` on `connection`, interrupting it once `cancel` fires.
///
/// A watcher task on `runtime` keeps calling `sqlite3_interrupt` after
/// cancellation until `read` returns, since an interrupt issued before a
/// statement starts is discarded. Any failure after cancellation reports as
/// [`SqliteSpotSourceError::Interrupted`].
fn interruptible<T>(
    runtime: &Handle,
    connection: &Connection,
    cancel: &CancellationToken,
    read: impl FnOnce(&Connection) -> Result<T, SqliteSpotSourceError>,
) -> Result<T, SqliteSpotSourceError> {
    if cancel.is_cancelled() {
        return Err(SqliteSpotSourceError::Interrupted);
    }
    let handle = connection.get_interrupt_handle();
    let token = cancel.clone();
    let watcher = runtime.spawn(async move {
        token.cancelled().await;
        loop {
            handle.interrupt();
            tokio::time::sleep(INTERRUPT_RETRY).await;
        }
    });
    let outcome = read(connection);
    watcher.abort();
    match outcome {
        Err(_) if cancel.is_cancelled() => Err(SqliteSpotSourceError::Interrupted),
        other => other,
    }
}

fn load_candidates(
    connection: &Connection,
    envelope: Rect<f64>,
) -> Result<Vec<Spot>, SqliteSpotSourceError> {
    let mut statement = connection.prepare(SELECT_IN_ENVELOPE)?;
    let mut rows = statement.query(params![
        envelope.min().y,
        envelope.max().y,
        envelope.min().x,
        envelope.max().x
    ])?;

    let mut spots = Vec::new();
    while let Some(row) = rows.next()? {
        spots.push(spot_from_row(row)?);
    }
    Ok(spots)
}

fn spot_from_row(row: &Row<'_>) -> Result<Spot, SqliteSpotSourceError> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let website: Option<String> = row.get(2)?;
    let lat: f64 = row.get(3)?;
    let lon: f64 = row.get(4)?;
    let description: String = row.get(5)?;
    let raw_rating: f64 = row.get(6)?;

    let invalid = |source: Box<dyn StdError + Send + Sync + 'static>| {
        SqliteSpotSourceError::InvalidRow {
            id: id.clone(),
            source,
        }
    };

    let uuid = Uuid::parse_str(&id).map_err(|err| invalid(Box::new(err)))?;
    let location = Coordinate::new(lat, lon).map_err(|err| invalid(Box::new(err)))?;
    let rating = Rating::new(raw_rating).map_err(|err| invalid(Box::new(err)))?;

    let mut builder = Spot::builder(SpotId::from_uuid(uuid), name, location)
        .description(description)
        .rating(rating);
    if let Some(url) = website {
        builder = builder.website(url);
    }
    builder.build().map_err(|err| invalid(Box::new(err)))
}

/// Errors raised while writing spots to SQLite.
#[derive(Debug, Error)]
pub enum PersistSpotsError {
    /// Opening or creating the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A SQLite operation failed.
    #[error("failed to {operation}")]
    Sqlite {
        /// Short description of the failed step.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Write `spots` into an open connection, creating the schema if needed.
///
/// Rows are upserted by id inside a single transaction. Re-importing a spot
/// replaces its fields but keeps its original position in fetch order.
/// Returns the number of spots written.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use spotter_core::{Coordinate, Spot, SpotId, persist_spots};
///
/// let mut connection = Connection::open_in_memory()?;
/// let spot = Spot::builder(SpotId::random(), "Plaza", Coordinate::new(0.0, 0.0)?).build()?;
/// assert_eq!(persist_spots(&mut connection, &[spot])?, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn persist_spots(
    connection: &mut Connection,
    spots: &[Spot],
) -> Result<usize, PersistSpotsError> {
    connection
        .execute_batch(CREATE_SCHEMA)
        .map_err(|source| PersistSpotsError::Sqlite {
            operation: "create spots schema",
            source,
        })?;

    let transaction = connection
        .transaction()
        .map_err(|source| PersistSpotsError::Sqlite {
            operation: "begin persistence transaction",
            source,
        })?;

    {
        let mut upsert = transaction
            .prepare_cached(UPSERT_SPOT)
            .map_err(|source| PersistSpotsError::Sqlite {
                operation: "prepare spot upsert",
                source,
            })?;

        for spot in spots {
            upsert
                .execute(params![
                    spot.id.to_string(),
                    spot.name,
                    spot.website,
                    spot.location.latitude(),
                    spot.location.longitude(),
                    spot.description,
                    spot.rating.value()
                ])
                .map_err(|source| PersistSpotsError::Sqlite {
                    operation: "upsert spot",
                    source,
                })?;
        }
    }

    transaction
        .commit()
        .map_err(|source| PersistSpotsError::Sqlite {
            operation: "commit persistence transaction",
            source,
        })?;

    Ok(spots.len())
}

/// Open (or create) the database at `path` and persist `spots` into it.
///
/// See [`persist_spots`] for the write semantics.
pub fn persist_spots_to_sqlite<P: AsRef<Path>>(
    path: P,
    spots: &[Spot],
) -> Result<usize, PersistSpotsError> {
    let db_path = path.as_ref();
    let mut connection = Connection::open(db_path).map_err(|source| PersistSpotsError::Open {
        path: db_path.to_path_buf(),
        source,
    })?;
    persist_spots(&mut connection, spots)
}
