//! Atomic byte-stuffed framing into a [`RingStore`].
//!
//! A frame is written as `FRAME_DELIM payload' FRAME_DELIM`, where
//! `payload'` is the payload with every delimiter and escape byte replaced by
//! a two-byte escape sequence (see [`EscapeAlphabet`]). The default alphabet
//! is the RFC 1055 SLIP one.
//!
//! [`FrameEncoder::encode_frame`] checks the worst-case encoded size against
//! the ring's free space before touching it. A frame that does not fit is
//! rejected with [`FrameRejected`] and the ring is left untouched; a frame
//! that fits is staged with [`RingStore::reserve_write`] and published with a
//! single [`RingStore::commit_write`], so a reader never observes half a frame.
//!
//! ```
//! use slipring::{frame::FrameEncoder, ring::RingStore};
//!
//! let mut ring = RingStore::new([0_u8; 8]).expect("capacity is valid");
//! let written = FrameEncoder::default()
//!     .encode_frame(&mut ring, &[0x41, 0x42])
//!     .expect("frame fits");
//!
//! assert_eq!(written, 4);
//! assert_eq!(ring.peek_contiguous(), &[0xC0, 0x41, 0x42, 0xC0]);
//! ```

use bytes::BufMut;

use crate::ring::{RingError, RingStore};

mod alphabet;
mod error;

pub use alphabet::{
    AlphabetError,
    ESC,
    ESC_DELIM,
    ESC_ESC,
    EscapeAlphabet,
    FRAME_DELIM,
};
pub use error::FrameRejected;

/// Stateless byte-stuffing encoder.
///
/// The encoder only carries its [`EscapeAlphabet`], so it is `Copy` and can
/// be shared freely between producers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameEncoder {
    alphabet: EscapeAlphabet,
}

impl FrameEncoder {
    /// Create an encoder using the default SLIP alphabet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            alphabet: EscapeAlphabet::SLIP,
        }
    }

    /// Create an encoder using a custom alphabet.
    #[must_use]
    pub const fn with_alphabet(alphabet: EscapeAlphabet) -> Self { Self { alphabet } }

    /// Alphabet used by this encoder.
    #[must_use]
    pub const fn alphabet(&self) -> EscapeAlphabet { self.alphabet }

    /// Number of bytes `payload` occupies once framed: two delimiters plus
    /// one byte per payload byte, or two for bytes that need escaping.
    #[must_use]
    pub fn encoded_len(&self, payload: &[u8]) -> usize {
        payload.iter().fold(2, |len, &byte| {
            len + if self.alphabet.needs_escape(byte) { 2 } else { 1 }
        })
    }

    /// Append `payload` to `ring` as one complete frame.
    ///
    /// Returns the number of bytes published.
    ///
    /// # Errors
    ///
    /// Returns [`FrameRejected`] if the framed payload does not fit in the
    /// ring's free space. Nothing is written in that case.
    pub fn encode_frame<S>(
        &self,
        ring: &mut RingStore<S>,
        payload: &[u8],
    ) -> Result<usize, FrameRejected>
    where
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        let required = self.encoded_len(payload);
        let available = ring.space_left();
        if available < required {
            return Err(FrameRejected {
                required,
                available,
            });
        }

        self.stage(ring, payload)
            .and_then(|staged| {
                debug_assert_eq!(staged, required, "staged length must match the estimate");
                ring.commit_write(staged).map(|()| staged)
            })
            .map_err(|_| FrameRejected {
                required,
                available,
            })
    }

    /// Write `payload` as one frame into an ordinary buffer.
    ///
    /// Produces the same bytes as [`encode_frame`](Self::encode_frame) but
    /// without a capacity check; `dst` grows as needed.
    pub fn encode_to_buf<B: BufMut>(&self, payload: &[u8], dst: &mut B) {
        let delim = self.alphabet.frame_delim();
        dst.put_u8(delim);
        for &byte in payload {
            match self.alphabet.escape(byte) {
                Some(code) => {
                    dst.put_u8(self.alphabet.esc());
                    dst.put_u8(code);
                }
                None => dst.put_u8(byte),
            }
        }
        dst.put_u8(delim);
    }

    fn stage<S>(&self, ring: &mut RingStore<S>, payload: &[u8]) -> Result<usize, RingError>
    where
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        let delim = self.alphabet.frame_delim();
        let mut offset = 0;
        let mut put = |ring: &mut RingStore<S>, byte: u8| {
            ring.reserve_write(offset, byte)?;
            offset += 1;
            Ok::<(), RingError>(())
        };

        put(ring, delim)?;
        for &byte in payload {
            match self.alphabet.escape(byte) {
                Some(code) => {
                    put(ring, self.alphabet.esc())?;
                    put(ring, code)?;
                }
                None => put(ring, byte)?,
            }
        }
        put(ring, delim)?;
        Ok(offset)
    }
}
