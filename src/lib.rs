//! Facade crate for the Spotter search service.
//!
//! This crate re-exports the core domain types and exposes the SQLite spot
//! source behind a feature flag.

#![forbid(unsafe_code)]

pub use spotter_core::{
    CLOSE_BAND_METRES, Coordinate, CoordinateError, EARTH_RADIUS_METRES, MemorySpotSource,
    QueryError, Rating, RegionKind, RegionQuery, SourceError, Spot, SpotError, SpotId,
    SpotQueryService, SpotSource, filter_region, haversine_distance, rank,
};

#[cfg(feature = "source-sqlite")]
pub use spotter_core::{
    PersistSpotsError, SqliteSpotSource, SqliteSpotSourceError, persist_spots_to_sqlite,
};

#[cfg(feature = "test-support")]
pub use spotter_core::test_support;
