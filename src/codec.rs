//! Stream codec for the byte-stuffed frame format.
//!
//! The ring only ever produces bytes; whatever sits on the far side of the
//! transport has to split them back into frames. [`SlipCodec`] implements
//! `tokio_util`'s [`Decoder`] and [`Encoder`] for the wire format written by
//! [`FrameEncoder`], so a host tool can wrap a serial port or pipe in a
//! `FramedRead` and receive one [`Bytes`] per frame.
//!
//! Decoding is tolerant the way a debug link has to be:
//!
//! - Back-to-back delimiters produce no empty frames.
//! - Bytes ahead of the first delimiter are treated as the tail of a frame whose start was lost
//!   (for example because the lossy single-byte path overwrote it) and are still returned as a
//!   frame.
//! - A malformed frame is reported once as a [`FramingError`] and then skipped up to the next
//!   delimiter; the following frames decode normally.
//!
//! # Error Handling
//!
//! Errors surface as [`io::Error`] as required by the codec traits; see
//! [`CodecError`] for the taxonomy and the conversion.

use std::io;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{EscapeAlphabet, FrameEncoder};

pub mod error;

pub use error::{CodecError, EofError, FramingError};

/// Minimum payload length limit in bytes.
///
/// Limits passed to [`SlipCodec::new`] are clamped to at least this value.
pub const MIN_FRAME_LENGTH: usize = 16;

/// Maximum payload length limit in bytes (1 MiB).
///
/// Limits passed to [`SlipCodec::new`] are clamped to at most this value to
/// bound memory use on a corrupted stream with no delimiters.
pub const MAX_FRAME_LENGTH: usize = 1024 * 1024;

pub(crate) fn clamp_frame_length(value: usize) -> usize {
    value.clamp(MIN_FRAME_LENGTH, MAX_FRAME_LENGTH)
}

/// Decoder and encoder for `FRAME_DELIM payload' FRAME_DELIM` streams.
#[derive(Clone, Debug)]
pub struct SlipCodec {
    encoder: FrameEncoder,
    max_frame_length: usize,
    frame: BytesMut,
    escaped: bool,
    discarding: bool,
}

impl SlipCodec {
    /// Construct a codec for the SLIP alphabet with a maximum payload length.
    #[must_use]
    pub fn new(max_frame_length: usize) -> Self {
        Self::with_alphabet(EscapeAlphabet::SLIP, max_frame_length)
    }

    /// Construct a codec for a custom alphabet.
    #[must_use]
    pub fn with_alphabet(alphabet: EscapeAlphabet, max_frame_length: usize) -> Self {
        Self {
            encoder: FrameEncoder::with_alphabet(alphabet),
            max_frame_length: clamp_frame_length(max_frame_length),
            frame: BytesMut::new(),
            escaped: false,
            discarding: false,
        }
    }

    /// Return the maximum payload length accepted by this codec.
    #[must_use]
    pub fn max_frame_length(&self) -> usize { self.max_frame_length }

    fn reset(&mut self) {
        self.frame.clear();
        self.escaped = false;
    }

    /// Drop the current frame and ignore input up to the next delimiter.
    fn abandon(&mut self, src: &mut BytesMut, consumed: usize, err: FramingError) -> io::Error {
        src.advance(consumed);
        self.reset();
        self.discarding = true;
        tracing::debug!(error = %err, "discarding malformed frame");
        CodecError::Framing(err).into()
    }
}

impl Default for SlipCodec {
    fn default() -> Self { Self::new(1024) }
}

impl Decoder for SlipCodec {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let alphabet = self.encoder.alphabet();

        for index in 0..src.len() {
            let byte = src[index];

            if byte == alphabet.frame_delim() {
                if self.discarding {
                    self.discarding = false;
                    continue;
                }
                if self.escaped {
                    // The delimiter still closes the frame, so resync
                    // immediately rather than discarding.
                    src.advance(index + 1);
                    self.reset();
                    let err = FramingError::InvalidEscape { code: byte };
                    return Err(CodecError::Framing(err).into());
                }
                if self.frame.is_empty() {
                    continue;
                }
                src.advance(index + 1);
                return Ok(Some(self.frame.split().freeze()));
            }

            if self.discarding {
                continue;
            }

            if self.escaped {
                self.escaped = false;
                let Some(decoded) = alphabet.unescape(byte) else {
                    return Err(self.abandon(src, index + 1, FramingError::InvalidEscape {
                        code: byte,
                    }));
                };
                self.frame.put_u8(decoded);
            } else if byte == alphabet.esc() {
                self.escaped = true;
                continue;
            } else {
                self.frame.put_u8(byte);
            }

            if self.frame.len() > self.max_frame_length {
                let size = self.frame.len();
                let max = self.max_frame_length;
                return Err(self.abandon(src, index + 1, FramingError::OversizedFrame { size, max }));
            }
        }

        src.clear();
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        self.discarding = false;
        if self.frame.is_empty() && !self.escaped {
            return Ok(None);
        }
        let bytes_received = self.frame.len();
        self.reset();
        Err(CodecError::Eof(EofError::MidFrame { bytes_received }).into())
    }
}

impl Encoder<Bytes> for SlipCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_length {
            return Err(CodecError::Framing(FramingError::OversizedFrame {
                size: item.len(),
                max: self.max_frame_length,
            })
            .into());
        }
        dst.reserve(self.encoder.encoded_len(&item));
        self.encoder.encode_to_buf(&item, dst);
        Ok(())
    }
}
