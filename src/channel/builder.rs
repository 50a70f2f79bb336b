//! Builder for configuring debug channels.

use super::{ChannelConfigError, DebugChannel};
use crate::{
    frame::EscapeAlphabet,
    ring::{DEFAULT_CAPACITY, RingStore},
};

/// Builder for [`DebugChannel`].
///
/// Defaults: [`DEFAULT_CAPACITY`] bytes of storage, the SLIP alphabet, and a
/// warning for every dropped frame. Construct via [`DebugChannel::builder`]
/// or [`Default::default`].
///
/// # Examples
///
/// ```
/// use slipring::{channel::DebugChannel, frame::EscapeAlphabet};
///
/// let channel = DebugChannel::builder()
///     .capacity(256)
///     .alphabet(EscapeAlphabet::SLIP)
///     .drop_log_every_n(32) // warn once per 32 dropped frames
///     .build()
///     .expect("failed to build DebugChannel");
/// assert_eq!(channel.capacity(), 256);
/// ```
///
/// Storage the caller already owns, such as a `static` array on a target
/// without a heap, goes through [`build_with_storage`](Self::build_with_storage):
///
/// ```
/// use slipring::channel::ChannelBuilder;
///
/// let channel = ChannelBuilder::default()
///     .build_with_storage([0_u8; 64])
///     .expect("failed to build DebugChannel");
/// assert_eq!(channel.space_left(), 63);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ChannelBuilder {
    capacity: usize,
    alphabet: EscapeAlphabet,
    drop_log_every_n: usize,
}

impl Default for ChannelBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            alphabet: EscapeAlphabet::SLIP,
            drop_log_every_n: 1,
        }
    }
}

impl ChannelBuilder {
    /// Set the storage length used by [`build`](Self::build).
    ///
    /// One byte of it is reserved, so the channel holds `capacity - 1` unread
    /// bytes.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the escape alphabet for framed writes.
    #[must_use]
    pub fn alphabet(mut self, alphabet: EscapeAlphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Emit a warning once every `n` dropped frames.
    ///
    /// Each drop is still logged at debug level.
    #[must_use]
    pub fn drop_log_every_n(mut self, n: usize) -> Self {
        self.drop_log_every_n = n;
        self
    }

    /// Allocate storage of the configured capacity and build the channel.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelConfigError::Ring`] if the capacity is below
    /// [`crate::ring::MIN_CAPACITY`] and
    /// [`ChannelConfigError::InvalidDropLogCadence`] if the cadence is zero.
    pub fn build(self) -> Result<DebugChannel<Box<[u8]>>, ChannelConfigError> {
        self.build_with_storage(vec![0_u8; self.capacity].into_boxed_slice())
    }

    /// Build the channel over caller-supplied storage. The configured
    /// capacity is ignored; the storage length is used instead.
    ///
    /// # Errors
    ///
    /// As for [`build`](Self::build).
    pub fn build_with_storage<S>(self, storage: S) -> Result<DebugChannel<S>, ChannelConfigError>
    where
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        if self.drop_log_every_n == 0 {
            return Err(ChannelConfigError::InvalidDropLogCadence);
        }
        let ring = RingStore::new(storage)?;
        Ok(DebugChannel::from_parts(
            ring,
            self.alphabet,
            self.drop_log_every_n,
        ))
    }
}
