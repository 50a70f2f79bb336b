//! Transport boundary for draining.

use std::io;

/// Destination for bytes drained from a channel.
///
/// A sink either accepts a whole span or fails; the channel applies no retry
/// of its own. Every [`io::Write`] is a sink: spans go through
/// [`write_all`](io::Write::write_all) and the sink is flushed once at the
/// end of each drain.
///
/// [`DebugChannel::drain`](super::DebugChannel::drain) calls
/// [`write_span`](Self::write_span) with the channel locked, so producers
/// wait for the write to finish. Keep writes short, and never let a sink
/// write into the channel it drains: the lock is not reentrant and the call
/// would deadlock.
pub trait ByteSink {
    /// Transmit `span` in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the span could not be transmitted completely.
    fn write_span(&mut self, span: &[u8]) -> io::Result<()>;

    /// Called after a drain that wrote at least one span. The channel is
    /// unlocked by then, so this is the place to report back into it.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered output could not be pushed out.
    fn finish(&mut self) -> io::Result<()> { Ok(()) }
}

impl<W: io::Write + ?Sized> ByteSink for W {
    fn write_span(&mut self, span: &[u8]) -> io::Result<()> { self.write_all(span) }

    fn finish(&mut self) -> io::Result<()> { self.flush() }
}
