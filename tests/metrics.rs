#![cfg(all(feature = "metrics", not(loom)))]
//! Tests for `slipring` metrics.
//!
//! These tests verify that channel operations update their counters using
//! `metrics_util::debugging::DebuggingRecorder`.
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use rstest::rstest;
use slipring::{channel::DebugChannel, ring::RingStore};
use slipring_testing::FailingSink;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn channel() -> DebugChannel<[u8; 8]> {
    DebugChannel::new(RingStore::new([0_u8; 8]).expect("valid capacity"))
}

#[rstest]
#[case(1)]
#[case(2)]
fn committed_frames_are_counted(#[case] expected: u64) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let channel = channel();

    metrics::with_local_recorder(&recorder, || {
        for _ in 0..expected {
            channel.encode_frame(&[1]).expect("frame fits");
        }
    });

    assert_counter_eq(&snapshotter, slipring::metrics::FRAMES_COMMITTED, expected);
}

#[test]
fn rejected_frames_are_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let channel = channel();

    metrics::with_local_recorder(&recorder, || {
        channel
            .encode_frame(&[0; 6])
            .expect_err("eight bytes cannot fit in seven");
    });

    assert_counter_eq(&snapshotter, slipring::metrics::FRAMES_REJECTED, 1);
}

#[test]
fn drained_bytes_are_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let channel = channel();
    channel.write_bytes(b"abcde");

    metrics::with_local_recorder(&recorder, || {
        let mut out = Vec::new();
        channel.drain(&mut out).expect("vec sink never fails");
    });

    assert_counter_eq(&snapshotter, slipring::metrics::BYTES_DRAINED, 5);
}

#[test]
fn sink_errors_are_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let channel = channel();
    channel.write_bytes(b"abc");

    metrics::with_local_recorder(&recorder, || {
        channel
            .drain(&mut FailingSink::new(1))
            .expect_err("first write fails");
    });

    assert_counter_eq(&snapshotter, slipring::metrics::SINK_ERRORS, 1);
    assert_eq!(channel.pending(), 3, "failed bytes stay queued");
}

fn assert_counter_eq(snapshotter: &Snapshotter, name: &str, expected: u64) {
    let metrics = snapshotter.snapshot().into_vec();
    assert!(
        metrics.iter().any(|(key, _, _, value)| {
            key.key().name() == name && matches!(value, DebugValue::Counter(c) if *c == expected)
        }),
        "expected {name} == {expected}, got {metrics:#?}"
    );
}
