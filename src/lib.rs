#![doc(html_root_url = "https://docs.rs/slipring/latest")]
//! Public API for the `slipring` library.
//!
//! This crate provides a byte ring over caller-supplied storage and a SLIP
//! framing engine that writes whole frames into it, plus the plumbing needed
//! to use the pair as a debug output channel: a shared [`DebugChannel`], a
//! background [`DrainTask`] and a [`SlipCodec`] for reading the stream back.

pub mod channel;
pub mod codec;
pub mod drain;
pub mod frame;
pub mod metrics;
pub mod ring;

pub use channel::{ByteSink, ChannelBuilder, DebugChannel, DrainError};
pub use codec::{CodecError, SlipCodec};
pub use drain::{DrainStats, DrainTask};
pub use frame::{EscapeAlphabet, FrameEncoder, FrameRejected};
pub use ring::{RingError, RingStore};
