//! Search regions and the filter that keeps spots inside them.
//!
//! Two region shapes are supported. A circle tests the Haversine distance
//! from the centre against the radius. A bounding box converts the radius to
//! a single degree delta and applies it to both axes. The box does not
//! correct for longitude compression away from the equator, so it is
//! narrower in ground distance east to west than north to south at high
//! latitudes. This is a known approximation.
//!
//! Both shapes include their boundary.

use std::{fmt, str::FromStr};

use geo::{Coord, Intersects, Rect};

use crate::{Coordinate, EARTH_RADIUS_METRES, QueryError, Spot, haversine_distance};

const LATITUDE_LIMIT: f64 = 90.0;
const LONGITUDE_LIMIT: f64 = 180.0;

/// Shape of the area searched around the query centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegionKind {
    /// Every spot within `radius` metres of great-circle distance.
    #[default]
    Circle,
    /// The axis-aligned degree box described in the module docs.
    BoundingBox,
}

impl RegionKind {
    /// Canonical wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::BoundingBox => "square",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionKind {
    type Err = QueryError;

    /// Parse a region kind.
    ///
    /// `circle` selects [`RegionKind::Circle`]; `square`, `bbox` and
    /// `bounding-box` select [`RegionKind::BoundingBox`]. Matching ignores
    /// ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = s.trim().to_ascii_lowercase();
        match kind.as_str() {
            "circle" => Ok(Self::Circle),
            "square" | "bbox" | "bounding-box" | "bounding_box" => Ok(Self::BoundingBox),
            _ => Err(QueryError::invalid_argument(format!(
                "unrecognised region type {s:?}"
            ))),
        }
    }
}

/// A validated search request: centre, radius in metres and region shape.
///
/// # Examples
/// ```
/// use spotter_core::{Coordinate, RegionKind, RegionQuery};
///
/// let centre = Coordinate::new(40.7128, -74.0060)?;
/// let query = RegionQuery::new(centre, 1_000.0, RegionKind::Circle)?;
/// assert!(query.contains(centre));
/// assert!(RegionQuery::new(centre, 0.0, RegionKind::Circle).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionQuery {
    center: Coordinate,
    radius_metres: f64,
    kind: RegionKind,
}

impl RegionQuery {
    /// Validate and construct a query. The radius must be finite and
    /// strictly positive.
    pub fn new(center: Coordinate, radius_metres: f64, kind: RegionKind) -> Result<Self, QueryError> {
        if !radius_metres.is_finite() || radius_metres <= 0.0 {
            return Err(QueryError::invalid_argument(format!(
                "radius must be a positive number of metres, got {radius_metres}"
            )));
        }
        Ok(Self {
            center,
            radius_metres,
            kind,
        })
    }

    /// Centre of the search region.
    #[must_use]
    pub const fn center(&self) -> Coordinate {
        self.center
    }

    /// Radius in metres.
    #[must_use]
    pub const fn radius_metres(&self) -> f64 {
        self.radius_metres
    }

    /// Region shape.
    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Whether `point` lies inside the region, boundary included.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        Membership::of(self).contains(point)
    }
}

/// Membership test for one query, with the box corners computed up front.
enum Membership {
    Circle { center: Coordinate, radius_metres: f64 },
    Box(Rect<f64>),
}

impl Membership {
    fn of(query: &RegionQuery) -> Self {
        match query.kind {
            RegionKind::Circle => Self::Circle {
                center: query.center,
                radius_metres: query.radius_metres,
            },
            RegionKind::BoundingBox => Self::Box(bounding_box(query.center, query.radius_metres)),
        }
    }

    fn contains(&self, point: Coordinate) -> bool {
        match self {
            Self::Circle {
                center,
                radius_metres,
            } => haversine_distance(*center, point) <= *radius_metres,
            // `Intersects` treats boundary points as inside the rectangle.
            Self::Box(bbox) => bbox.intersects(&Coord::from(point)),
        }
    }
}

/// Convert a radius in metres to the degree delta used by bounding boxes.
///
/// The delta is `radius / EARTH_RADIUS_METRES * (180 / π)`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "degree conversion divides by the Earth radius"
)]
pub fn degree_delta(radius_metres: f64) -> f64 {
    (radius_metres / EARTH_RADIUS_METRES).to_degrees()
}

/// The bounding box searched by [`RegionKind::BoundingBox`] queries.
///
/// The rectangle uses `x = longitude` and `y = latitude` and spans
/// `centre ± degree_delta(radius)` on both axes. Corners are not clamped to
/// valid coordinate ranges.
///
/// # Examples
/// ```
/// use spotter_core::{Coordinate, bounding_box};
///
/// let bbox = bounding_box(Coordinate::new(40.7128, -74.0060)?, 1_000.0);
/// assert!((bbox.min().y - 40.703_807).abs() < 1e-6);
/// assert!((bbox.max().x + 73.997_007).abs() < 1e-6);
/// # Ok::<(), spotter_core::CoordinateError>(())
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "box corners offset the centre by the degree delta"
)]
pub fn bounding_box(center: Coordinate, radius_metres: f64) -> Rect<f64> {
    let delta = degree_delta(radius_metres);
    Rect::new(
        Coord {
            x: center.longitude() - delta,
            y: center.latitude() - delta,
        },
        Coord {
            x: center.longitude() + delta,
            y: center.latitude() + delta,
        },
    )
}

/// A rectangle guaranteed to cover both region kinds for `center` and
/// `radius_metres`.
///
/// Candidate sources use it as a cheap index pre-filter. The latitude span
/// matches [`bounding_box`]; the longitude span widens by the cosine of the
/// latitude furthest from the equator so that circles away from the equator
/// stay covered. Spans that reach a pole or cross the antimeridian widen to
/// the full longitude range. The result is clamped to valid coordinates.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "longitude widening divides by the latitude cosine"
)]
pub fn candidate_envelope(center: Coordinate, radius_metres: f64) -> Rect<f64> {
    let delta = degree_delta(radius_metres);
    let min_lat = (center.latitude() - delta).max(-LATITUDE_LIMIT);
    let max_lat = (center.latitude() + delta).min(LATITUDE_LIMIT);
    let extreme_lat = min_lat.abs().max(max_lat.abs());
    let cosine = extreme_lat.to_radians().cos();

    let full_width = || (-LONGITUDE_LIMIT, LONGITUDE_LIMIT);
    let (min_lon, max_lon) = if extreme_lat >= LATITUDE_LIMIT || cosine <= f64::EPSILON {
        full_width()
    } else {
        let lon_delta = delta / cosine;
        let west = center.longitude() - lon_delta;
        let east = center.longitude() + lon_delta;
        if west < -LONGITUDE_LIMIT || east > LONGITUDE_LIMIT {
            full_width()
        } else {
            (west, east)
        }
    };

    Rect::new(
        Coord {
            x: min_lon,
            y: min_lat,
        },
        Coord {
            x: max_lon,
            y: max_lat,
        },
    )
}

/// Keep the candidates that fall inside `query`'s region.
///
/// Survivors keep their input order.
///
/// # Examples
/// ```
/// use spotter_core::{Coordinate, RegionKind, RegionQuery, Spot, SpotId, filter_region};
///
/// let centre = Coordinate::new(0.0, 0.0)?;
/// let near = Spot::builder(SpotId::random(), "near", Coordinate::new(0.001, 0.0)?).build()?;
/// let far = Spot::builder(SpotId::random(), "far", Coordinate::new(1.0, 0.0)?).build()?;
///
/// let query = RegionQuery::new(centre, 500.0, RegionKind::Circle)?;
/// let kept = filter_region(&query, vec![near.clone(), far]);
/// assert_eq!(kept, vec![near]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn filter_region(query: &RegionQuery, candidates: Vec<Spot>) -> Vec<Spot> {
    let membership = Membership::of(query);
    candidates
        .into_iter()
        .filter(|spot| membership.contains(spot.location))
        .collect()
}
