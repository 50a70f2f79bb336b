//! Error types for ring construction and the staged-write protocol.

use thiserror::Error;

/// Errors reported by [`RingStore`](super::RingStore).
///
/// Every variant describes a caller mistake. The ring state is left exactly
/// as it was before the failing call.
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// The backing storage is too short to hold any data.
    #[error("invalid ring capacity {capacity}; must be >= {min}")]
    InvalidCapacity {
        /// Length of the supplied storage.
        capacity: usize,
        /// Smallest accepted length.
        min: usize,
    },
    /// A commit tried to publish more bytes than could have been staged.
    #[error("invalid commit of {count} bytes; only {available} free")]
    InvalidCommit {
        /// Number of bytes the caller asked to publish.
        count: usize,
        /// Free space at the time of the call.
        available: usize,
    },
    /// A staged write fell outside the free region.
    #[error("staging offset {offset} overruns free space of {available} bytes")]
    StagingOverrun {
        /// Offset past `head` the caller tried to write.
        offset: usize,
        /// Free space at the time of the call.
        available: usize,
    },
    /// The consumer tried to skip bytes it has not been shown.
    #[error("cannot advance tail by {count}; only {available} contiguous bytes readable")]
    AdvancePastHead {
        /// Number of bytes the caller asked to consume.
        count: usize,
        /// Length of the current contiguous span.
        available: usize,
    },
}
