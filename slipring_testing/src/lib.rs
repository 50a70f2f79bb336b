//! Utilities shared by the `slipring` integration tests.
//!
//! The sinks record or refuse what a drain writes, and [`decode_frames`]
//! turns captured wire bytes back into payloads for assertions.
//!
//! ```rust
//! use slipring::{channel::DebugChannel, ring::RingStore};
//! use slipring_testing::{RecordingSink, decode_frames};
//!
//! let channel = DebugChannel::new(RingStore::new([0_u8; 32]).unwrap());
//! channel.encode_frame(b"ping").unwrap();
//!
//! let mut sink = RecordingSink::default();
//! channel.drain(&mut sink).unwrap();
//! assert_eq!(decode_frames(&sink.bytes()), vec![b"ping".to_vec()]);
//! ```

pub mod logging;
pub mod sinks;
pub mod wire;

pub use logging::{LoggerHandle, logger};
pub use sinks::{FailingSink, RecordingSink};
pub use wire::decode_frames;
