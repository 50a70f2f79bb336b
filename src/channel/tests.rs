//! Unit tests for the shared debug channel.

use std::{fmt::Write as _, io, time::Duration};

use rstest::{fixture, rstest};
use tracing_test::traced_test;

use super::*;
use crate::{
    frame::{ESC, ESC_ESC, FRAME_DELIM},
    ring::RingError,
};

#[fixture]
fn channel() -> DebugChannel<[u8; 8]> {
    DebugChannel::new(RingStore::new([0_u8; 8]).expect("valid capacity"))
}

/// Sink that accepts `budget` spans and fails afterwards.
struct FlakySink {
    budget: usize,
    written: Vec<u8>,
    flushed: bool,
}

impl ByteSink for FlakySink {
    fn write_span(&mut self, span: &[u8]) -> io::Result<()> {
        if self.budget == 0 {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "transport busy"));
        }
        self.budget -= 1;
        self.written.extend_from_slice(span);
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.flushed = true;
        Ok(())
    }
}

#[rstest]
fn frames_and_lossy_bytes_share_the_ring(channel: DebugChannel<[u8; 8]>) {
    channel.push_byte(b'!');
    channel.encode_frame(&[ESC]).expect("frame fits");

    let mut out = Vec::new();
    let drained = channel.drain(&mut out).expect("vec sink never fails");

    assert_eq!(drained, 5);
    assert_eq!(out, vec![b'!', FRAME_DELIM, ESC, ESC_ESC, FRAME_DELIM]);
    assert_eq!(channel.pending(), 0);
}

#[rstest]
fn drain_of_empty_channel_writes_nothing(channel: DebugChannel<[u8; 8]>) {
    let mut sink = FlakySink {
        budget: 0,
        written: Vec::new(),
        flushed: false,
    };
    assert_eq!(channel.drain(&mut sink).expect("nothing to write"), 0);
    assert!(!sink.flushed, "an idle drain must not touch the sink");
}

#[rstest]
fn drain_follows_data_across_the_wrap(channel: DebugChannel<[u8; 8]>) {
    channel.write_bytes(&[0; 6]);
    let mut out = Vec::new();
    channel.drain(&mut out).expect("vec sink never fails");

    channel.write_bytes(&[1, 2, 3, 4, 5]);
    let mut sink = FlakySink {
        budget: 2,
        written: Vec::new(),
        flushed: false,
    };
    assert_eq!(channel.drain(&mut sink).expect("two spans fit the budget"), 5);
    assert_eq!(sink.written, vec![1, 2, 3, 4, 5]);
    assert!(sink.flushed);
}

#[rstest]
fn failed_span_stays_in_the_ring(channel: DebugChannel<[u8; 8]>) {
    channel.write_bytes(&[0; 6]);
    let mut out = Vec::new();
    channel.drain(&mut out).expect("vec sink never fails");
    channel.write_bytes(&[1, 2, 3, 4, 5]);

    let mut sink = FlakySink {
        budget: 1,
        written: Vec::new(),
        flushed: false,
    };
    let err = channel
        .drain(&mut sink)
        .expect_err("second span exceeds the budget");

    assert!(matches!(err, DrainError::Sink { drained: 2, .. }), "got {err:?}");
    assert_eq!(err.drained(), 2);
    assert_eq!(sink.written, vec![1, 2]);
    assert_eq!(channel.pending(), 3);

    let mut out = Vec::new();
    channel.drain(&mut out).expect("retry succeeds");
    assert_eq!(out, vec![3, 4, 5]);
}

/// Sink that reports each drain back into the channel it drains.
struct EchoingSink<'a> {
    channel: &'a DebugChannel<[u8; 8]>,
    written: Vec<u8>,
}

impl ByteSink for EchoingSink<'_> {
    fn write_span(&mut self, span: &[u8]) -> io::Result<()> {
        self.written.extend_from_slice(span);
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.channel.push_byte(b'!');
        Ok(())
    }
}

#[rstest]
fn finish_runs_with_the_channel_unlocked(channel: DebugChannel<[u8; 8]>) {
    channel.write_bytes(&[0; 6]);
    let mut out = Vec::new();
    channel.drain(&mut out).expect("vec sink never fails");
    channel.write_bytes(&[1, 2, 3]);

    let mut sink = EchoingSink {
        channel: &channel,
        written: Vec::new(),
    };
    let drained = channel.drain(&mut sink).expect("echoing sink never fails");

    assert_eq!(drained, 3);
    assert_eq!(sink.written, vec![1, 2, 3]);
    assert_eq!(channel.pending(), 1, "the report lands after the drained bytes");
}

#[rstest]
#[traced_test]
fn rejected_frames_are_counted_and_logged(channel: DebugChannel<[u8; 8]>) {
    channel.write_bytes(&[0; 5]);

    let err = channel
        .encode_frame(&[1])
        .expect_err("three bytes cannot fit in two");

    assert_eq!(
        err,
        FrameRejected {
            required: 3,
            available: 2,
        }
    );
    assert_eq!(channel.dropped_frames(), 1);
    assert_eq!(channel.pending(), 5);
    assert!(logs_contain("frame dropped, buffer full"));
    assert!(logs_contain("debug channel is dropping frames"));
}

#[test]
#[traced_test]
fn drop_warnings_follow_the_configured_cadence() {
    let channel = ChannelBuilder::default()
        .drop_log_every_n(3)
        .build_with_storage([0_u8; 2])
        .expect("valid configuration");

    channel
        .encode_frame(&[])
        .expect_err("an empty frame needs two bytes");
    channel
        .encode_frame(&[])
        .expect_err("an empty frame needs two bytes");
    assert!(!logs_contain("debug channel is dropping frames"));

    channel
        .encode_frame(&[])
        .expect_err("an empty frame needs two bytes");
    assert!(logs_contain("dropped=3"));
}

#[rstest]
fn lossy_writer_formats_into_the_ring(channel: DebugChannel<[u8; 8]>) {
    write!(channel.writer(), "a{}c", 'b').expect("lossy writes never fail");
    io::Write::write_all(&mut channel.writer(), b"de").expect("lossy writes never fail");

    let mut out = Vec::new();
    channel.drain(&mut out).expect("vec sink never fails");
    assert_eq!(out, b"abcde");
}

#[rstest]
fn lossy_writer_keeps_the_newest_output(channel: DebugChannel<[u8; 8]>) {
    write!(channel.writer(), "0123456789").expect("lossy writes never fail");

    let mut out = Vec::new();
    channel.drain(&mut out).expect("vec sink never fails");
    assert_eq!(out, b"3456789");
}

#[rstest]
#[case::too_small(ChannelBuilder::default().capacity(1), ChannelConfigError::Ring(RingError::InvalidCapacity { capacity: 1, min: 2 }))]
fn builder_rejects_invalid_capacity(
    #[case] builder: ChannelBuilder,
    #[case] expected: ChannelConfigError,
) {
    let err = builder.build().expect_err("configuration must be rejected");
    assert_eq!(err, expected);
}

#[test]
fn builder_applies_capacity_and_alphabet() {
    let alphabet = EscapeAlphabet::new(0x7E, 0x7D, 0x5E, 0x5D).expect("distinct bytes");
    let channel = DebugChannel::builder()
        .capacity(16)
        .alphabet(alphabet)
        .build()
        .expect("valid configuration");

    assert_eq!(channel.capacity(), 16);
    assert_eq!(channel.space_left(), 15);
    assert_eq!(channel.alphabet(), alphabet);

    channel.encode_frame(&[1]).expect("frame fits");
    let mut out = Vec::new();
    channel.drain(&mut out).expect("vec sink never fails");
    assert_eq!(out, vec![0x7E, 1, 0x7E]);
}

#[tokio::test]
async fn producer_wakes_a_waiting_drain() {
    let channel = std::sync::Arc::new(
        DebugChannel::builder()
            .build()
            .expect("valid configuration"),
    );

    let waiter = tokio::spawn({
        let channel = channel.clone();
        async move {
            channel.notified().await;
            let mut out = Vec::new();
            channel.drain(&mut out).expect("vec sink never fails");
            out
        }
    });

    tokio::task::yield_now().await;
    channel.encode_frame(b"hi").expect("frame fits");

    let out = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("drain should wake")
        .expect("waiter task panicked");
    assert_eq!(out, vec![FRAME_DELIM, b'h', b'i', FRAME_DELIM]);
}
