//! Error types for channel configuration and draining.

use std::io;

use thiserror::Error;

use crate::ring::RingError;

/// Errors returned when building a [`DebugChannel`](super::DebugChannel) or
/// a [`DrainTask`](crate::drain::DrainTask).
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChannelConfigError {
    /// The ring could not be created.
    #[error(transparent)]
    Ring(#[from] RingError),
    /// The dropped-frame warning cadence was zero.
    #[error("invalid drop log cadence 0; must be >= 1")]
    InvalidDropLogCadence,
    /// The drain poll interval was zero.
    #[error("invalid poll interval; must be greater than zero")]
    InvalidPollInterval,
}

/// Errors returned by [`DebugChannel::drain`](super::DebugChannel::drain).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DrainError {
    /// The sink failed to accept a span.
    #[error("sink write failed after {drained} bytes: {source}")]
    Sink {
        /// Bytes successfully written during this drain before the failure.
        drained: usize,
        /// Error reported by the sink.
        #[source]
        source: io::Error,
    },
    /// The ring rejected an index update.
    #[error(transparent)]
    Ring(#[from] RingError),
}

impl DrainError {
    /// Record how many bytes were written before the failure.
    pub(super) fn after(self, drained: usize) -> Self {
        match self {
            Self::Sink { source, .. } => Self::Sink { drained, source },
            other @ Self::Ring(_) => other,
        }
    }

    /// Bytes written during the failed drain.
    #[must_use]
    pub fn drained(&self) -> usize {
        match self {
            Self::Sink { drained, .. } => *drained,
            Self::Ring(_) => 0,
        }
    }
}

impl From<io::Error> for DrainError {
    fn from(source: io::Error) -> Self { Self::Sink { drained: 0, source } }
}
