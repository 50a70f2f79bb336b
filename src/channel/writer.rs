//! Stream adapter translating generic writes into lossy byte pushes.

use std::{fmt, io};

use super::DebugChannel;

/// `io::Write` and `fmt::Write` front end for a [`DebugChannel`].
///
/// Every byte goes through the lossy path, so writes always succeed in full
/// even when older output has to be overwritten. Use
/// [`DebugChannel::encode_frame`] when a message must arrive intact or not at
/// all.
///
/// ```
/// use std::fmt::Write as _;
///
/// use slipring::{channel::DebugChannel, ring::RingStore};
///
/// let channel = DebugChannel::new(RingStore::new([0_u8; 32]).expect("valid capacity"));
/// write!(channel.writer(), "temp={}", 21).expect("lossy writes never fail");
///
/// let mut out = Vec::new();
/// channel.drain(&mut out).expect("vec sink never fails");
/// assert_eq!(out, b"temp=21");
/// ```
#[derive(Debug)]
pub struct LossyWriter<'a, S> {
    channel: &'a DebugChannel<S>,
}

impl<'a, S> LossyWriter<'a, S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    pub(super) fn new(channel: &'a DebugChannel<S>) -> Self { Self { channel } }
}

impl<S> io::Write for LossyWriter<'_, S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.channel.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.channel.wake();
        Ok(())
    }
}

impl<S> fmt::Write for LossyWriter<'_, S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.channel.write_bytes(s.as_bytes());
        Ok(())
    }
}
