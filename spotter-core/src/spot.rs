//! Spot records and their validated field types.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::Coordinate;

/// Lowest rating a spot may carry.
pub const MIN_RATING: f64 = 0.0;
/// Highest rating a spot may carry.
pub const MAX_RATING: f64 = 5.0;

/// Opaque unique identifier of a spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SpotId(Uuid);

impl SpotId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors returned when validating spot data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpotError {
    /// The rating was not finite or fell outside `0.0..=5.0`.
    #[error("rating {0} is outside [0, 5]")]
    RatingOutOfRange(f64),
    /// The display name was blank.
    #[error("spot name must not be empty")]
    EmptyName,
}

/// User rating of a spot, bounded to `0.0..=5.0`.
///
/// # Examples
/// ```
/// use spotter_core::Rating;
///
/// let rating = Rating::new(4.5)?;
/// assert_eq!(rating.value(), 4.5);
/// assert!(Rating::new(5.1).is_err());
/// # Ok::<(), spotter_core::SpotError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
pub struct Rating(f64);

impl Rating {
    /// Validate and construct a rating.
    pub fn new(value: f64) -> Result<Self, SpotError> {
        if value.is_finite() && (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SpotError::RatingOutOfRange(value))
        }
    }

    /// The numeric rating.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Rating {
    type Error = SpotError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// A point of interest returned by spot searches.
///
/// Spots are owned by the candidate source; queries treat them as read-only
/// values. When serialised, the location is written under `coordinates` as
/// a WKT point.
///
/// # Examples
/// ```
/// use spotter_core::{Coordinate, Rating, Spot, SpotId};
///
/// let spot = Spot::builder(
///     SpotId::random(),
///     "Bryant Park",
///     Coordinate::new(40.7536, -73.9832)?,
/// )
/// .website("https://bryantpark.org")
/// .rating(Rating::new(4.7)?)
/// .build()?;
///
/// assert_eq!(spot.name, "Bryant Park");
/// assert_eq!(spot.rating.value(), 4.7);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spot {
    /// Unique identifier.
    pub id: SpotId,
    /// Display name.
    pub name: String,
    /// Optional website URL.
    #[cfg_attr(feature = "serde", serde(default))]
    pub website: Option<String>,
    /// Geographic position.
    #[cfg_attr(feature = "serde", serde(rename = "coordinates"))]
    pub location: Coordinate,
    /// Free-text description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Rating in `0.0..=5.0`.
    pub rating: Rating,
}

impl Spot {
    /// Start building a spot with the required fields.
    ///
    /// Optional fields default to no website, an empty description and a
    /// rating of `0.0`.
    #[must_use]
    pub fn builder(id: SpotId, name: impl Into<String>, location: Coordinate) -> SpotBuilder {
        SpotBuilder {
            id,
            name: name.into(),
            website: None,
            location,
            description: String::new(),
            rating: Rating(MIN_RATING),
        }
    }
}

/// Incremental constructor for [`Spot`].
#[derive(Debug, Clone)]
pub struct SpotBuilder {
    id: SpotId,
    name: String,
    website: Option<String>,
    location: Coordinate,
    description: String,
    rating: Rating,
}

impl SpotBuilder {
    /// Set the website URL.
    #[must_use]
    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Set the free-text description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the rating.
    #[must_use]
    pub const fn rating(mut self, rating: Rating) -> Self {
        self.rating = rating;
        self
    }

    /// Validate and produce the [`Spot`].
    pub fn build(self) -> Result<Spot, SpotError> {
        if self.name.trim().is_empty() {
            return Err(SpotError::EmptyName);
        }
        Ok(Spot {
            id: self.id,
            name: self.name,
            website: self.website,
            location: self.location,
            description: self.description,
            rating: self.rating,
        })
    }
}
