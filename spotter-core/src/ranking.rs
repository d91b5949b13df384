//! Two-tier ordering of filtered spots.
//!
//! Spots closer than [`CLOSE_BAND_METRES`] to the centre are ranked against
//! each other by rating, highest first. Any comparison involving a spot
//! outside that band falls back to distance, nearest first. The comparator
//! is applied through a single stable sort, so equal keys keep their input
//! order.

use std::cmp::Ordering;

use crate::{Coordinate, Rating, Spot, haversine_distance};

/// Distance below which spots are ranked by rating instead of distance.
pub const CLOSE_BAND_METRES: f64 = 50.0;

/// The values the ranking comparator reads for one spot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankKey {
    /// Great-circle distance from the query centre in metres.
    pub distance_metres: f64,
    /// The spot's rating.
    pub rating: Rating,
}

impl RankKey {
    /// Compute the key of `spot` relative to `center`.
    #[must_use]
    pub fn for_spot(center: Coordinate, spot: &Spot) -> Self {
        Self {
            distance_metres: haversine_distance(center, spot.location),
            rating: spot.rating,
        }
    }

    fn is_close(&self) -> bool {
        self.distance_metres < CLOSE_BAND_METRES
    }
}

/// Compare two ranking keys.
///
/// When both keys are inside the close band the higher rating sorts first;
/// otherwise the smaller distance sorts first. `Ordering::Equal` means the
/// stable sort keeps the input order.
///
/// # Examples
/// ```
/// use std::cmp::Ordering;
/// use spotter_core::{RankKey, Rating, compare_ranked};
///
/// let loved = RankKey { distance_metres: 40.0, rating: Rating::new(4.5)? };
/// let nearer = RankKey { distance_metres: 10.0, rating: Rating::new(3.8)? };
/// assert_eq!(compare_ranked(&loved, &nearer), Ordering::Less);
/// # Ok::<(), spotter_core::SpotError>(())
/// ```
#[must_use]
pub fn compare_ranked(left: &RankKey, right: &RankKey) -> Ordering {
    if left.is_close() && right.is_close() {
        right.rating.value().total_cmp(&left.rating.value())
    } else {
        left.distance_metres.total_cmp(&right.distance_metres)
    }
}

/// Order `spots` around `center` using [`compare_ranked`].
///
/// Distances are computed once per spot before sorting.
#[must_use]
pub fn rank(center: Coordinate, spots: Vec<Spot>) -> Vec<Spot> {
    let mut keyed: Vec<(RankKey, Spot)> = spots
        .into_iter()
        .map(|spot| (RankKey::for_spot(center, &spot), spot))
        .collect();
    keyed.sort_by(|(left, _), (right, _)| compare_ranked(left, right));
    keyed.into_iter().map(|(_, spot)| spot).collect()
}
