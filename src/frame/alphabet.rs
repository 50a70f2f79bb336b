//! Byte-stuffing vocabulary.

use thiserror::Error;

/// Frame boundary marker, written before and after every frame.
pub const FRAME_DELIM: u8 = 0xC0;
/// Introduces a two-byte escape sequence.
pub const ESC: u8 = 0xDB;
/// Escaped form of [`FRAME_DELIM`] inside a payload.
pub const ESC_DELIM: u8 = 0xDC;
/// Escaped form of [`ESC`] inside a payload.
pub const ESC_ESC: u8 = 0xDD;

/// The four byte values that drive byte stuffing.
///
/// `frame_delim` and `esc` are reserved on the wire. When either appears in a
/// payload it is written as `esc` followed by `esc_delim` or `esc_esc`
/// respectively. All four values must be distinct, otherwise a decoder could
/// not tell a frame boundary from escaped data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscapeAlphabet {
    frame_delim: u8,
    esc: u8,
    esc_delim: u8,
    esc_esc: u8,
}

/// Errors returned when building an [`EscapeAlphabet`].
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AlphabetError {
    /// Two roles were given the same byte value.
    #[error("escape alphabet reuses byte {byte:#04x} for {first} and {second}")]
    DuplicateByte {
        /// Repeated byte value.
        byte: u8,
        /// Role that claimed the byte first.
        first: &'static str,
        /// Role that repeated it.
        second: &'static str,
    },
}

impl EscapeAlphabet {
    /// RFC 1055 SLIP alphabet: `0xC0`, `0xDB`, `0xDC`, `0xDD`.
    pub const SLIP: Self = Self {
        frame_delim: FRAME_DELIM,
        esc: ESC,
        esc_delim: ESC_DELIM,
        esc_esc: ESC_ESC,
    };

    /// Build a custom alphabet.
    ///
    /// # Errors
    ///
    /// Returns [`AlphabetError::DuplicateByte`] if any two values are equal.
    pub fn new(
        frame_delim: u8,
        esc: u8,
        esc_delim: u8,
        esc_esc: u8,
    ) -> Result<Self, AlphabetError> {
        let roles = [
            ("frame_delim", frame_delim),
            ("esc", esc),
            ("esc_delim", esc_delim),
            ("esc_esc", esc_esc),
        ];
        for (i, &(first, byte)) in roles.iter().enumerate() {
            if let Some(&(second, _)) = roles[i + 1..].iter().find(|(_, other)| *other == byte) {
                return Err(AlphabetError::DuplicateByte {
                    byte,
                    first,
                    second,
                });
            }
        }
        Ok(Self {
            frame_delim,
            esc,
            esc_delim,
            esc_esc,
        })
    }

    /// Frame boundary byte.
    #[must_use]
    pub const fn frame_delim(&self) -> u8 { self.frame_delim }

    /// Escape introducer byte.
    #[must_use]
    pub const fn esc(&self) -> u8 { self.esc }

    /// Code following `esc` for an escaped delimiter.
    #[must_use]
    pub const fn esc_delim(&self) -> u8 { self.esc_delim }

    /// Code following `esc` for an escaped `esc`.
    #[must_use]
    pub const fn esc_esc(&self) -> u8 { self.esc_esc }

    /// Returns `true` if `byte` must be escaped inside a payload.
    #[must_use]
    pub const fn needs_escape(&self, byte: u8) -> bool {
        byte == self.frame_delim || byte == self.esc
    }

    /// Code to write after `esc` for `byte`, or `None` if `byte` is written
    /// as is.
    #[must_use]
    pub const fn escape(&self, byte: u8) -> Option<u8> {
        if byte == self.frame_delim {
            Some(self.esc_delim)
        } else if byte == self.esc {
            Some(self.esc_esc)
        } else {
            None
        }
    }

    /// Payload byte represented by the code following `esc`, or `None` for
    /// an invalid escape.
    #[must_use]
    pub const fn unescape(&self, code: u8) -> Option<u8> {
        if code == self.esc_delim {
            Some(self.frame_delim)
        } else if code == self.esc_esc {
            Some(self.esc)
        } else {
            None
        }
    }
}

impl Default for EscapeAlphabet {
    fn default() -> Self { Self::SLIP }
}
