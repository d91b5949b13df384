//! Great-circle distance on a spherical Earth.

use crate::Coordinate;

/// Mean Earth radius used by every distance and degree conversion.
pub const EARTH_RADIUS_METRES: f64 = 6_371_000.0;

/// Distance in metres between two coordinates using the Haversine formula.
///
/// The result is symmetric, non-negative and zero for identical inputs.
/// Inputs are expected to be valid coordinates; range checks belong to the
/// caller.
///
/// # Examples
/// ```
/// use spotter_core::{Coordinate, haversine_distance};
///
/// let a = Coordinate::new(40.7128, -74.0060)?;
/// let b = Coordinate::new(40.7028, -73.996)?;
/// let metres = haversine_distance(a, b);
/// assert!((metres - 1395.32).abs() < 0.01);
/// # Ok::<(), spotter_core::CoordinateError>(())
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the Haversine formula is floating-point trigonometry"
)]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let delta_lat = (b.latitude() - a.latitude()).to_radians();
    let delta_lon = (b.longitude() - a.longitude()).to_radians();

    let raw = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push the term fractionally above one for antipodal points.
    let half_chord = raw.clamp(0.0, 1.0);
    let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());

    EARTH_RADIUS_METRES * angle
}
