//! Error types for the SLIP stream codec.
//!
//! # Error Categories
//!
//! - [`FramingError`]: Malformed frames on the wire (oversized frames, invalid escape sequences).
//!   The decoder discards the offending frame and resynchronises on the next delimiter, so these
//!   are recoverable.
//! - [`EofError`]: The stream ended inside a frame.
//! - [`CodecError`]: Top-level enum wrapping both categories plus I/O errors.

use std::io;

use thiserror::Error;

/// Framing-level errors found while splitting the byte stream into frames.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// Decoded payload grew past the configured maximum.
    #[error("frame exceeds max length: {size} > {max}")]
    OversizedFrame {
        /// Payload bytes accumulated when the limit was crossed.
        size: usize,
        /// Maximum allowed payload size.
        max: usize,
    },

    /// An escape byte was followed by something other than an escape code.
    #[error("invalid escape sequence: code {code:#04x}")]
    InvalidEscape {
        /// Byte that followed the escape introducer.
        code: u8,
    },
}

/// The stream ended before a frame's closing delimiter.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EofError {
    /// EOF received mid-frame.
    ///
    /// The producer stopped, or the transport was cut, after the opening
    /// delimiter and some payload but before the closing delimiter.
    #[error("premature EOF: {bytes_received} payload bytes of an unterminated frame")]
    MidFrame {
        /// Payload bytes decoded before EOF.
        bytes_received: usize,
    },
}

/// Top-level codec error taxonomy.
///
/// # Examples
///
/// ```
/// use slipring::codec::{CodecError, FramingError};
///
/// let err = CodecError::Framing(FramingError::InvalidEscape { code: 0x01 });
/// assert!(err.is_recoverable());
/// assert_eq!(err.error_type(), "framing");
/// ```
#[derive(Debug, Error)]
pub enum CodecError {
    /// Framing layer error.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Transport layer I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// End-of-stream handling.
    #[error("EOF: {0}")]
    Eof(#[from] EofError),
}

impl CodecError {
    /// Returns true if decoding can continue after this error.
    ///
    /// Framing errors only cost the frame they occur in. I/O errors and EOF
    /// end the stream.
    #[must_use]
    pub fn is_recoverable(&self) -> bool { matches!(self, Self::Framing(_)) }

    /// Returns the error category as a string for logging and metrics.
    ///
    /// One of: `"framing"`, `"io"`, or `"eof"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Framing(_) => "framing",
            Self::Io(_) => "io",
            Self::Eof(_) => "eof",
        }
    }
}

impl From<CodecError> for io::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => e,
            CodecError::Framing(e) => io::Error::new(io::ErrorKind::InvalidData, e),
            CodecError::Eof(e) => io::Error::new(io::ErrorKind::UnexpectedEof, e),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
