//! Geographic coordinates and their textual wire format.
//!
//! A [`Coordinate`] stores latitude and longitude in degrees. It converts to
//! [`geo::Coord`] using the usual GIS axis order (`x = longitude`,
//! `y = latitude`). The textual form written by [`fmt::Display`] is a WKT
//! point (`POINT(lon lat)`); [`FromStr`] additionally accepts a `"lat,lon"`
//! pair.

use std::{fmt, str::FromStr};

use geo::Coord;
use thiserror::Error;

const LATITUDE_LIMIT: f64 = 90.0;
const LONGITUDE_LIMIT: f64 = 180.0;

/// Errors returned when building or parsing a [`Coordinate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude was not finite or fell outside `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude was not finite or fell outside `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    /// The text was neither a WKT point nor a `lat,lon` pair.
    #[error("unrecognised coordinate format: {0:?}")]
    Malformed(String),
}

/// A WGS84 position in degrees.
///
/// # Examples
/// ```
/// use spotter_core::Coordinate;
///
/// let nyc = Coordinate::new(40.7128, -74.0060)?;
/// assert_eq!(nyc.to_string(), "POINT(-74.006 40.7128)");
/// assert_eq!("40.7128,-74.006".parse::<Coordinate>()?, nyc);
/// # Ok::<(), spotter_core::CoordinateError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Validate and construct a coordinate.
    ///
    /// Bounds are inclusive, so both poles and the antimeridian are accepted.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-LATITUDE_LIMIT..=LATITUDE_LIMIT).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-LONGITUDE_LIMIT..=LONGITUDE_LIMIT).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(value: Coordinate) -> Self {
        Self {
            x: value.longitude,
            y: value.latitude,
        }
    }
}

impl TryFrom<Coord<f64>> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: Coord<f64>) -> Result<Self, Self::Error> {
        Self::new(value.y, value.x)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.longitude, self.latitude)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || CoordinateError::Malformed(s.to_owned());

        if let Some(body) = strip_wkt_point(trimmed) {
            let mut parts = body.split_whitespace();
            let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(malformed());
            };
            let longitude = lon.parse::<f64>().map_err(|_| malformed())?;
            let latitude = lat.parse::<f64>().map_err(|_| malformed())?;
            return Self::new(latitude, longitude);
        }

        let (lat, lon) = trimmed.split_once(',').ok_or_else(malformed)?;
        let latitude = lat.trim().parse::<f64>().map_err(|_| malformed())?;
        let longitude = lon.trim().parse::<f64>().map_err(|_| malformed())?;
        Self::new(latitude, longitude)
    }
}

/// Return the text between the parentheses of `POINT(...)`, ignoring case.
fn strip_wkt_point(text: &str) -> Option<&str> {
    let open = text.find('(')?;
    let (tag, rest) = text.split_at(open);
    if !tag.trim().eq_ignore_ascii_case("POINT") {
        return None;
    }
    rest.strip_prefix('(')?.strip_suffix(')')
}

#[cfg(feature = "serde")]
impl serde::Serialize for Coordinate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
