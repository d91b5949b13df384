//! Core domain types and algorithms for the Spotter search service.
//!
//! The crate turns a centre point and radius into a search region, keeps the
//! candidate spots that fall inside it, and orders the survivors so nearby,
//! well-rated spots surface first. Storage is reached only through the
//! [`SpotSource`] capability so every query can be exercised against a fake.

#![forbid(unsafe_code)]

pub mod coordinate;
pub mod distance;
pub mod error;
pub mod query;
pub mod ranking;
pub mod region;
pub mod source;
pub mod spot;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use coordinate::{Coordinate, CoordinateError};
pub use distance::{EARTH_RADIUS_METRES, haversine_distance};
pub use error::QueryError;
pub use query::SpotQueryService;
pub use ranking::{CLOSE_BAND_METRES, RankKey, compare_ranked, rank};
pub use region::{
    RegionKind, RegionQuery, bounding_box, candidate_envelope, degree_delta, filter_region,
};
pub use source::{MemorySpotSource, SourceError, SpotSource};
pub use spot::{Rating, Spot, SpotError, SpotId};

#[cfg(feature = "source-sqlite")]
pub use source::{
    PersistSpotsError, SqliteSpotSource, SqliteSpotSourceError, persist_spots,
    persist_spots_to_sqlite,
};
