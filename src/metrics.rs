//! Metric helpers for `slipring`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. With the
//! `metrics` feature disabled the helpers compile to nothing.

/// Name of the counter tracking frames published into a ring.
pub const FRAMES_COMMITTED: &str = "slipring_frames_committed_total";
/// Name of the counter tracking frames dropped for lack of space.
pub const FRAMES_REJECTED: &str = "slipring_frames_rejected_total";
/// Name of the counter tracking bytes handed to a sink.
pub const BYTES_DRAINED: &str = "slipring_bytes_drained_total";
/// Name of the counter tracking failed sink writes.
pub const SINK_ERRORS: &str = "slipring_sink_errors_total";

#[cfg(feature = "metrics")]
mod enabled {
    use metrics::counter;

    use super::{BYTES_DRAINED, FRAMES_COMMITTED, FRAMES_REJECTED, SINK_ERRORS};

    pub fn inc_frames_committed() { counter!(FRAMES_COMMITTED).increment(1); }

    pub fn inc_frames_rejected() { counter!(FRAMES_REJECTED).increment(1); }

    pub fn add_bytes_drained(count: usize) {
        counter!(BYTES_DRAINED).increment(u64::try_from(count).unwrap_or(u64::MAX));
    }

    pub fn inc_sink_errors() { counter!(SINK_ERRORS).increment(1); }
}

#[cfg(not(feature = "metrics"))]
mod enabled {
    pub fn inc_frames_committed() {}

    pub fn inc_frames_rejected() {}

    pub fn add_bytes_drained(_count: usize) {}

    pub fn inc_sink_errors() {}
}

/// Record a frame published into a ring.
pub fn inc_frames_committed() { enabled::inc_frames_committed(); }

/// Record a frame rejected because the ring was too full.
pub fn inc_frames_rejected() { enabled::inc_frames_rejected(); }

/// Record `count` bytes written to a sink.
pub fn add_bytes_drained(count: usize) { enabled::add_bytes_drained(count); }

/// Record a failed sink write.
pub fn inc_sink_errors() { enabled::inc_sink_errors(); }
