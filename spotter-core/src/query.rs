//! Orchestration of fetch, filter and rank for a single search.

use tokio_util::sync::CancellationToken;

use crate::{QueryError, RegionQuery, Spot, SpotSource, filter_region, rank};

/// Answers region queries against a [`SpotSource`].
///
/// The service holds no mutable state; one instance can serve any number of
/// concurrent queries.
///
/// # Examples
/// ```
/// use spotter_core::{
///     Coordinate, MemorySpotSource, RegionKind, RegionQuery, Spot, SpotId, SpotQueryService,
/// };
/// use tokio_util::sync::CancellationToken;
///
/// # tokio::runtime::Builder::new_current_thread().build()?.block_on(async {
/// let centre = Coordinate::new(0.0, 0.0)?;
/// let spot = Spot::builder(SpotId::random(), "Plaza", Coordinate::new(0.0001, 0.0)?).build()?;
/// let service = SpotQueryService::new(MemorySpotSource::new(vec![spot.clone()]));
///
/// let query = RegionQuery::new(centre, 100.0, RegionKind::Circle)?;
/// let found = service.query(&query, &CancellationToken::new()).await?;
/// assert_eq!(found, vec![spot]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # })?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct SpotQueryService<S> {
    source: S,
}

impl<S: SpotSource> SpotQueryService<S> {
    /// Create a service reading candidates from `source`.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// The candidate source backing this service.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Fetch, filter and rank the spots inside `query`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UpstreamUnavailable`] when the source fails and
    /// [`QueryError::Canceled`] when `cancel` fires before the query
    /// completes. An in-flight fetch is dropped as soon as `cancel` fires.
    pub async fn query(
        &self,
        query: &RegionQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Spot>, QueryError> {
        if cancel.is_cancelled() {
            return Err(QueryError::Canceled);
        }

        let center = query.center();
        let candidates = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(QueryError::Canceled),
            fetched = self.source.fetch_candidates(center, query.radius_metres()) => fetched?,
        };
        log::debug!(
            "fetched {count} candidates around {center} within {radius} m",
            count = candidates.len(),
            radius = query.radius_metres()
        );

        if cancel.is_cancelled() {
            return Err(QueryError::Canceled);
        }
        let inside = filter_region(query, candidates);
        let ranked = rank(center, inside);
        log::debug!(
            "returning {count} spots for {kind} query",
            count = ranked.len(),
            kind = query.kind()
        );
        Ok(ranked)
    }
}
