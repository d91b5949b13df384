//! Candidate sources supplying spots to queries.
//!
//! A [`SpotSource`] stands in for the persistence layer. Given a centre and
//! radius it returns every spot that might lie inside either region kind;
//! the query service applies the exact region test afterwards, so sources
//! may over-fetch but must never under-fetch. [`candidate_envelope`] gives a
//! rectangle that satisfies that contract.
//!
//! [`candidate_envelope`]: crate::candidate_envelope

use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::{Coordinate, Spot};

mod memory;
#[cfg(feature = "source-sqlite")]
mod sqlite;

pub use memory::MemorySpotSource;
#[cfg(feature = "source-sqlite")]
pub use sqlite::{
    PersistSpotsError, SqliteSpotSource, SqliteSpotSourceError, persist_spots,
    persist_spots_to_sqlite,
};

/// Failure reported by a [`SpotSource`].
///
/// The concrete adapter error is kept as the source so callers can log the
/// full chain without the core depending on any storage crate.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SourceError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl SourceError {
    /// Wrap an adapter error.
    #[must_use]
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Build an error from a message alone.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Fetch candidate spots around a centre point.
///
/// Implementations must be safe to call from concurrent queries and must
/// return at least every spot within [`crate::candidate_envelope`] of
/// `center`. The returned order is significant: ranking ties keep it.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use spotter_core::{Coordinate, SourceError, Spot, SpotSource};
///
/// struct EmptySource;
///
/// #[async_trait]
/// impl SpotSource for EmptySource {
///     async fn fetch_candidates(
///         &self,
///         _center: Coordinate,
///         _radius_metres: f64,
///     ) -> Result<Vec<Spot>, SourceError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
#[async_trait]
pub trait SpotSource: Send + Sync {
    /// Return candidate spots for a search of `radius_metres` around
    /// `center`.
    async fn fetch_candidates(
        &self,
        center: Coordinate,
        radius_metres: f64,
    ) -> Result<Vec<Spot>, SourceError>;
}

#[async_trait]
impl<S> SpotSource for Arc<S>
where
    S: SpotSource + ?Sized,
{
    async fn fetch_candidates(
        &self,
        center: Coordinate,
        radius_metres: f64,
    ) -> Result<Vec<Spot>, SourceError> {
        (**self).fetch_candidates(center, radius_metres).await
    }
}
