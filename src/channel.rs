//! Shared debug channel wrapping a [`RingStore`].
//!
//! A [`DebugChannel`] owns one ring and is handed by reference (usually
//! inside an [`Arc`](std::sync::Arc)) to every context that produces or
//! drains bytes. The ring itself is single-context; the channel serialises
//! callers with a mutex held for one ring operation at a time. A drain holds
//! it for exactly one contiguous span, including the sink write for that
//! span, so producers stall for at most one span's transmission.
//!
//! Producers have three entry points:
//!
//! - [`DebugChannel::push_byte`] and [`DebugChannel::write_bytes`] for best-effort output that
//!   overwrites the oldest bytes when the ring is full,
//! - [`DebugChannel::writer`] for a [`LossyWriter`] usable with `write!`,
//! - [`DebugChannel::encode_frame`] for all-or-nothing framed messages.
//!
//! The consumer calls [`DebugChannel::drain`] with a [`ByteSink`], typically
//! from a [`DrainTask`](crate::drain::DrainTask) woken through
//! [`DebugChannel::notified`].

#[cfg(not(loom))]
use std::sync::{
    Mutex,
    PoisonError,
    atomic::{AtomicUsize, Ordering},
};

#[cfg(loom)]
use loom::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};
#[cfg(loom)]
use std::sync::PoisonError;
use tokio::sync::{Notify, futures::Notified};
use tracing::{debug, warn};

use crate::{
    frame::{EscapeAlphabet, FrameEncoder, FrameRejected},
    metrics,
    ring::RingStore,
};

mod builder;
mod error;
mod sink;
mod writer;

pub use builder::ChannelBuilder;
pub use error::{ChannelConfigError, DrainError};
pub use sink::ByteSink;
pub use writer::LossyWriter;

/// Ring buffer shared between producers and a drain.
pub struct DebugChannel<S> {
    ring: Mutex<RingStore<S>>,
    encoder: FrameEncoder,
    wakeup: Notify,
    dropped_frames: AtomicUsize,
    drop_log_every_n: usize,
}

impl DebugChannel<Box<[u8]>> {
    /// Start building a channel with heap-allocated storage.
    #[must_use]
    pub fn builder() -> ChannelBuilder { ChannelBuilder::default() }
}

impl<S> DebugChannel<S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    pub(crate) fn from_parts(
        ring: RingStore<S>,
        alphabet: EscapeAlphabet,
        drop_log_every_n: usize,
    ) -> Self {
        Self {
            ring: Mutex::new(ring),
            encoder: FrameEncoder::with_alphabet(alphabet),
            wakeup: Notify::new(),
            dropped_frames: AtomicUsize::new(0),
            drop_log_every_n,
        }
    }

    /// Wrap an existing ring using the SLIP alphabet.
    #[must_use]
    pub fn new(ring: RingStore<S>) -> Self { Self::from_parts(ring, EscapeAlphabet::SLIP, 1) }

    fn with_ring<R>(&self, f: impl FnOnce(&mut RingStore<S>) -> R) -> R {
        // Every ring operation either completes or leaves the ring untouched,
        // so a panic elsewhere while the lock was held cannot corrupt it.
        let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut ring)
    }

    /// Append one byte, overwriting the oldest unread byte if the ring is
    /// full. See [`RingStore::push_byte`].
    pub fn push_byte(&self, byte: u8) {
        self.with_ring(|ring| ring.push_byte(byte));
        self.wakeup.notify_one();
    }

    /// Append `bytes` under a single lock with the same lossy semantics as
    /// [`push_byte`](Self::push_byte).
    pub fn write_bytes(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.with_ring(|ring| {
            for &byte in bytes {
                ring.push_byte(byte);
            }
        });
        self.wakeup.notify_one();
    }

    /// Borrow a [`LossyWriter`] that feeds this channel.
    #[must_use]
    pub fn writer(&self) -> LossyWriter<'_, S> { LossyWriter::new(self) }

    /// Append `payload` as one complete frame or not at all.
    ///
    /// Returns the number of bytes published.
    ///
    /// # Errors
    ///
    /// Returns [`FrameRejected`] if the frame does not fit. The ring is left
    /// unchanged and the drop is counted in
    /// [`dropped_frames`](Self::dropped_frames).
    pub fn encode_frame(&self, payload: &[u8]) -> Result<usize, FrameRejected> {
        let result = self.with_ring(|ring| self.encoder.encode_frame(ring, payload));
        match result {
            Ok(_) => {
                metrics::inc_frames_committed();
                self.wakeup.notify_one();
            }
            Err(rejected) => self.record_rejection(rejected),
        }
        result
    }

    fn record_rejection(&self, rejected: FrameRejected) {
        metrics::inc_frames_rejected();
        let dropped = self.dropped_frames.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            required = rejected.required,
            available = rejected.available,
            "frame dropped, buffer full"
        );
        if dropped % self.drop_log_every_n == 0 {
            warn!(dropped, "debug channel is dropping frames");
        }
    }

    /// Write every readable byte to `sink`, one contiguous span at a time.
    ///
    /// The lock is taken per span, so producers can keep writing between
    /// spans. It is held while `sink` writes a span: a producer calling
    /// [`push_byte`](Self::push_byte) or [`encode_frame`](Self::encode_frame)
    /// meanwhile blocks until that write returns. The mutex is not
    /// reentrant, so a sink must never write back into this channel (for
    /// example through a log layer that feeds it), or the drain deadlocks.
    ///
    /// Returns the number of bytes written; `0` means the ring was empty.
    ///
    /// # Errors
    ///
    /// Returns [`DrainError::Sink`] if the sink fails. The failed span stays
    /// in the ring and is offered again on the next drain.
    pub fn drain<K>(&self, sink: &mut K) -> Result<usize, DrainError>
    where
        K: ByteSink + ?Sized,
    {
        let mut drained = 0;
        loop {
            let written = self.with_ring(|ring| {
                let span = ring.peek_contiguous();
                if span.is_empty() {
                    return Ok(0);
                }
                sink.write_span(span)?;
                let len = span.len();
                ring.advance_tail(len)?;
                Ok::<usize, DrainError>(len)
            });
            match written {
                Ok(0) => break,
                Ok(len) => drained += len,
                Err(err) => {
                    metrics::inc_sink_errors();
                    return Err(err.after(drained));
                }
            }
        }
        if drained > 0 {
            sink.finish().map_err(|source| {
                metrics::inc_sink_errors();
                DrainError::Sink { drained, source }
            })?;
            metrics::add_bytes_drained(drained);
        }
        Ok(drained)
    }

    /// Number of bytes waiting to be drained.
    #[must_use]
    pub fn pending(&self) -> usize { self.with_ring(|ring| ring.len()) }

    /// Free space in the ring.
    #[must_use]
    pub fn space_left(&self) -> usize { self.with_ring(|ring| ring.space_left()) }

    /// Length of the ring's backing storage.
    #[must_use]
    pub fn capacity(&self) -> usize { self.with_ring(|ring| ring.capacity()) }

    /// Number of frames rejected since the channel was created.
    #[must_use]
    pub fn dropped_frames(&self) -> usize { self.dropped_frames.load(Ordering::Relaxed) }

    /// Alphabet used for framed writes.
    #[must_use]
    pub fn alphabet(&self) -> EscapeAlphabet { self.encoder.alphabet() }

    /// Wait for the next producer wakeup.
    ///
    /// A wakeup sent while nobody is waiting is remembered, so a drain that
    /// checks the ring and then awaits this future never misses data.
    pub fn notified(&self) -> Notified<'_> { self.wakeup.notified() }

    /// Wake the drain without writing anything.
    pub fn wake(&self) { self.wakeup.notify_one(); }
}

impl<S> std::fmt::Debug for DebugChannel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugChannel")
            .field("alphabet", &self.encoder.alphabet())
            .field("dropped_frames", &self.dropped_frames.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(all(test, not(loom)))]
mod tests;
