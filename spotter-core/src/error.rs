//! Failure taxonomy for spot queries.

use thiserror::Error;

use crate::{CoordinateError, SourceError};

/// Errors returned by [`crate::SpotQueryService::query`] and query
/// construction.
///
/// Every variant aborts the query: callers never receive a partial result.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query itself was malformed, e.g. a non-positive radius or an
    /// unknown region kind.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The candidate source failed.
    #[error("spot source unavailable: {0}")]
    UpstreamUnavailable(#[source] SourceError),
    /// The caller cancelled the query before it completed.
    #[error("query was cancelled")]
    Canceled,
}

impl QueryError {
    /// Build a [`QueryError::InvalidArgument`] from any displayable reason.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }
}

impl From<CoordinateError> for QueryError {
    fn from(value: CoordinateError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<SourceError> for QueryError {
    fn from(value: SourceError) -> Self {
        Self::UpstreamUnavailable(value)
    }
}
