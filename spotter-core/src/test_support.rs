//! Builders and fake sources shared by unit and behaviour tests.
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for downstream crates.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{Coordinate, EARTH_RADIUS_METRES, Rating, SourceError, Spot, SpotId, SpotSource};

/// Build a coordinate, panicking on out-of-range input.
///
/// # Panics
///
/// Panics when `latitude` or `longitude` is out of range.
#[must_use]
#[expect(clippy::expect_used, reason = "test helpers take known-good literals")]
pub fn coordinate(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate::new(latitude, longitude).expect("test coordinate must be valid")
}

/// Build a spot named `spot-{id}` at the given position.
///
/// # Panics
///
/// Panics when the position or rating is out of range.
#[must_use]
#[expect(clippy::expect_used, reason = "test helpers take known-good literals")]
pub fn spot_at(id: u128, latitude: f64, longitude: f64, rating: f64) -> Spot {
    Spot::builder(
        SpotId::from_uuid(Uuid::from_u128(id)),
        format!("spot-{id}"),
        coordinate(latitude, longitude),
    )
    .rating(Rating::new(rating).expect("test rating must be valid"))
    .build()
    .expect("test spot must be valid")
}

/// Build a spot `metres` due north of `center`.
///
/// Moving along a meridian keeps the Haversine distance equal to `metres`.
///
/// # Panics
///
/// Panics when the offset leaves the valid latitude range.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "converts a metre offset into degrees of latitude"
)]
pub fn spot_north_of(id: u128, center: Coordinate, metres: f64, rating: f64) -> Spot {
    let offset = (metres / EARTH_RADIUS_METRES).to_degrees();
    spot_at(
        id,
        center.latitude() + offset,
        center.longitude(),
        rating,
    )
}

/// Source that always fails with a fixed message.
#[derive(Debug, Clone)]
pub struct FailingSource {
    message: String,
}

impl FailingSource {
    /// Create a source failing with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl SpotSource for FailingSource {
    async fn fetch_candidates(
        &self,
        _center: Coordinate,
        _radius_metres: f64,
    ) -> Result<Vec<Spot>, SourceError> {
        Err(SourceError::msg(self.message.clone()))
    }
}

/// Source whose fetch never completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingSource;

#[async_trait]
impl SpotSource for PendingSource {
    async fn fetch_candidates(
        &self,
        _center: Coordinate,
        _radius_metres: f64,
    ) -> Result<Vec<Spot>, SourceError> {
        std::future::pending().await
    }
}

/// Source returning a fixed candidate list and recording every call.
#[derive(Debug, Default)]
pub struct RecordingSource {
    spots: Vec<Spot>,
    calls: Mutex<Vec<(Coordinate, f64)>>,
}

impl RecordingSource {
    /// Create a source that returns `spots` verbatim from every fetch.
    #[must_use]
    pub fn with_spots(spots: Vec<Spot>) -> Self {
        Self {
            spots,
            calls: Mutex::default(),
        }
    }

    /// Arguments of every fetch so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<(Coordinate, f64)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SpotSource for RecordingSource {
    async fn fetch_candidates(
        &self,
        center: Coordinate,
        radius_metres: f64,
    ) -> Result<Vec<Spot>, SourceError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((center, radius_metres));
        Ok(self.spots.clone())
    }
}
