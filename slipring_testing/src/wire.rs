//! Decoding captured wire bytes.

use bytes::BytesMut;
use slipring::codec::SlipCodec;
use tokio_util::codec::Decoder;

/// Decode every complete frame in `wire` with the default [`SlipCodec`].
///
/// Bytes after the last delimiter are ignored.
///
/// # Panics
///
/// Panics if the stream contains a malformed frame.
#[must_use]
pub fn decode_frames(wire: &[u8]) -> Vec<Vec<u8>> {
    let mut codec = SlipCodec::default();
    let mut buf = BytesMut::from(wire);
    let mut frames = Vec::new();
    while let Some(frame) = codec.decode(&mut buf).expect("malformed frame") {
        frames.push(frame.to_vec());
    }
    frames
}
