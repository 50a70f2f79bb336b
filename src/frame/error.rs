//! Error returned when a frame cannot be written.

use thiserror::Error;

/// A frame did not fit in the ring and was dropped.
///
/// Rejection is the only way framing can fail. It is recoverable: the ring is
/// unchanged, so the caller may retry after the consumer drains, shorten the
/// payload, or give up on the frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("frame dropped: needs {required} bytes, ring has {available} free")]
pub struct FrameRejected {
    /// Encoded size of the frame, delimiters and escapes included.
    pub required: usize,
    /// Free space in the ring when the frame was offered.
    pub available: usize,
}
