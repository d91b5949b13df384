//! In-memory candidate source backed by an R\*-tree.

use async_trait::async_trait;
use geo::Coord;
use rstar::{AABB, RTree, RTreeObject};

use crate::{Coordinate, Spot, candidate_envelope};

use super::{SourceError, SpotSource};

/// Spot paired with its insertion position so fetches can restore it.
#[derive(Debug, Clone)]
struct IndexedSpot {
    position: usize,
    spot: Spot,
}

impl RTreeObject for IndexedSpot {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let location = Coord::from(self.spot.location);
        AABB::from_point([location.x, location.y])
    }
}

/// Immutable [`SpotSource`] holding every spot in memory.
///
/// Fetches query the R\*-tree with [`candidate_envelope`] and return matches
/// in insertion order.
///
/// # Examples
/// ```
/// use spotter_core::{Coordinate, MemorySpotSource, Spot, SpotId};
///
/// let spot = Spot::builder(SpotId::random(), "Plaza", Coordinate::new(0.0, 0.0)?).build()?;
/// let source = MemorySpotSource::new(vec![spot]);
/// assert_eq!(source.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct MemorySpotSource {
    index: RTree<IndexedSpot>,
}

impl MemorySpotSource {
    /// Bulk-load a source from `spots`.
    #[must_use]
    pub fn new<I>(spots: I) -> Self
    where
        I: IntoIterator<Item = Spot>,
    {
        let entries = spots
            .into_iter()
            .enumerate()
            .map(|(position, spot)| IndexedSpot { position, spot })
            .collect();
        Self {
            index: RTree::bulk_load(entries),
        }
    }

    /// Number of spots held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.size()
    }

    /// Whether the source holds no spots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.size() == 0
    }

    /// Spots inside the candidate envelope, in insertion order.
    fn candidates(&self, center: Coordinate, radius_metres: f64) -> Vec<Spot> {
        let rect = candidate_envelope(center, radius_metres);
        let envelope =
            AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        let mut hits: Vec<&IndexedSpot> = self
            .index
            .locate_in_envelope_intersecting(&envelope)
            .collect();
        hits.sort_unstable_by_key(|entry| entry.position);
        hits.into_iter().map(|entry| entry.spot.clone()).collect()
    }
}

impl FromIterator<Spot> for MemorySpotSource {
    fn from_iter<T: IntoIterator<Item = Spot>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[async_trait]
impl SpotSource for MemorySpotSource {
    async fn fetch_candidates(
        &self,
        center: Coordinate,
        radius_metres: f64,
    ) -> Result<Vec<Spot>, SourceError> {
        Ok(self.candidates(center, radius_metres))
    }
}
