//! `slipring` binary.
//!
//! `pipe` feeds stdin through a [`DebugChannel`] drained by a [`DrainTask`]
//! into stdout. `decode` reverses the framing with [`SlipCodec`].

mod cli;

use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use bytes::{Bytes, BytesMut};
use clap::Parser;
use futures::StreamExt;
use slipring::{
    channel::{ByteSink, DebugChannel},
    codec::SlipCodec,
    drain::{DrainStats, DrainTask},
};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_util::{
    codec::{Decoder, FramedRead},
    sync::CancellationToken,
};
use tracing::{error, info, warn};

use crate::cli::{Cli, Command, Mode, Output};

type BoxError = Box<dyn std::error::Error>;

/// Writes every byte as two lowercase hex digits and ends the line once per
/// drain pass, so a span split by the ring's wrap stays on one line.
struct HexSink<W>(W);

impl<W: Write> ByteSink for HexSink<W> {
    fn write_span(&mut self, span: &[u8]) -> io::Result<()> {
        for byte in span {
            write!(self.0, "{byte:02x}")?;
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        writeln!(self.0)?;
        self.0.flush()
    }
}

/// Decoder that logs malformed frames and carries on with the next one.
///
/// `FramedRead` stops yielding after a decoder error, so recoverable
/// framing errors never leave this wrapper.
struct SkipMalformed {
    inner: SlipCodec,
    skipped: usize,
}

impl SkipMalformed {
    fn new(inner: SlipCodec) -> Self { Self { inner, skipped: 0 } }

    fn skip(&mut self, err: &io::Error) {
        self.skipped += 1;
        warn!(error = %err, "skipping malformed frame");
    }
}

impl Decoder for SkipMalformed {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.inner.decode(src) {
                Err(err) if err.kind() == io::ErrorKind::InvalidData => self.skip(&err),
                other => return other,
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.inner.decode_eof(src) {
                Err(err) if err.kind() == io::ErrorKind::InvalidData => self.skip(&err),
                other => return other,
            }
        }
    }
}

/// Queue every line of `input` and drain the channel into `sink`.
async fn pipe_lines<R, K>(
    input: R,
    sink: K,
    capacity: usize,
    mode: Mode,
    poll_interval: Option<Duration>,
) -> Result<(K, DrainStats), BoxError>
where
    R: AsyncRead + Unpin,
    K: ByteSink + Send + 'static,
{
    let channel = Arc::new(DebugChannel::builder().capacity(capacity).build()?);
    let shutdown = CancellationToken::new();
    let task = DrainTask::new(channel.clone(), sink).poll_interval(poll_interval)?;
    let drain = tokio::spawn(task.run(shutdown.clone()));

    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        match mode {
            Mode::Frame => {
                if let Err(rejected) = channel.encode_frame(line.as_bytes()) {
                    warn!(%rejected, "line not queued");
                }
            }
            Mode::Lossy => {
                channel.write_bytes(line.as_bytes());
                channel.push_byte(b'\n');
            }
        }
    }

    shutdown.cancel();
    let (sink, stats) = drain.await?;
    info!(
        bytes = stats.bytes,
        dropped_frames = channel.dropped_frames(),
        "input exhausted"
    );
    Ok((sink, stats))
}

async fn pipe(capacity: usize, mode: Mode, output: Output, poll_ms: u64) -> Result<(), BoxError> {
    let poll_interval = (poll_ms > 0).then(|| Duration::from_millis(poll_ms));
    let stdin = tokio::io::stdin();
    match output {
        Output::Raw => {
            pipe_lines(stdin, io::stdout(), capacity, mode, poll_interval).await?;
        }
        Output::Hex => {
            pipe_lines(stdin, HexSink(io::stdout()), capacity, mode, poll_interval).await?;
        }
    }
    Ok(())
}

/// Decode every frame in `input` and write one payload per line to `out`.
///
/// Returns the number of payloads written.
async fn decode_frames<R, W>(
    input: R,
    out: &mut W,
    max_frame_length: usize,
    output: Output,
) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut frames = FramedRead::new(input, SkipMalformed::new(SlipCodec::new(max_frame_length)));
    let mut written = 0;
    while let Some(payload) = frames.next().await {
        let payload = payload?;
        match output {
            Output::Raw => {
                out.write_all(&payload)?;
                writeln!(out)?;
            }
            Output::Hex => {
                let mut hex = HexSink(&mut *out);
                hex.write_span(&payload)?;
                hex.finish()?;
            }
        }
        written += 1;
    }
    let skipped = frames.decoder().skipped;
    if skipped > 0 {
        warn!(skipped, "malformed frames were dropped");
    }
    out.flush()?;
    Ok(written)
}

async fn decode(max_frame_length: usize, output: Output) -> Result<(), BoxError> {
    let mut stdout = io::stdout().lock();
    decode_frames(tokio::io::stdin(), &mut stdout, max_frame_length, output).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so they never mix with drained output.
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Pipe {
            capacity,
            mode,
            output,
            poll_ms,
        } => pipe(capacity, mode, output, poll_ms).await,
        Command::Decode {
            max_frame_length,
            output,
        } => decode(max_frame_length, output).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "slipring failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use rstest::rstest;
    use slipring::{
        channel::ByteSink,
        frame::{ESC, FRAME_DELIM},
    };
    use tracing_test::traced_test;

    use super::{HexSink, Mode, Output, decode_frames, pipe_lines};

    const GOOD_AFTER_BAD: [u8; 9] = [
        FRAME_DELIM,
        1,
        ESC,
        0x42,
        FRAME_DELIM,
        FRAME_DELIM,
        b'o',
        b'k',
        FRAME_DELIM,
    ];

    #[tokio::test]
    #[traced_test]
    async fn decode_keeps_going_after_a_malformed_frame() {
        let mut out = Vec::new();
        let written = decode_frames(&GOOD_AFTER_BAD[..], &mut out, 1024, Output::Raw)
            .await
            .expect("malformed frames are skipped");

        assert_eq!(written, 1);
        assert_eq!(out, b"ok\n");
        assert!(logs_contain("skipping malformed frame"));
        assert!(logs_contain("skipped=1"));
    }

    #[tokio::test]
    async fn decode_skips_every_malformed_frame() {
        let mut wire = GOOD_AFTER_BAD.to_vec();
        wire.extend_from_slice(&[FRAME_DELIM, ESC, 0x00, FRAME_DELIM, b'z', FRAME_DELIM]);

        let mut out = Vec::new();
        decode_frames(wire.as_slice(), &mut out, 1024, Output::Hex)
            .await
            .expect("malformed frames are skipped");

        assert_eq!(out, b"6f6b\n7a\n");
    }

    #[tokio::test]
    async fn decode_reports_truncated_input() {
        let mut out = Vec::new();
        let wire = [FRAME_DELIM, b'a', FRAME_DELIM, b'b'];
        let err = decode_frames(&wire[..], &mut out, 1024, Output::Raw)
            .await
            .expect_err("input ends mid-frame");

        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(out, b"a\n");
    }

    #[test]
    fn hex_sink_ends_the_line_once_per_drain() {
        let mut out = Vec::new();
        let mut sink = HexSink(&mut out);
        sink.write_span(&[FRAME_DELIM, 0x01]).expect("vec never fails");
        sink.write_span(&[0xAB, FRAME_DELIM]).expect("vec never fails");
        sink.finish().expect("vec never fails");

        assert_eq!(out, b"c001abc0\n");
    }

    #[rstest]
    #[case::framed(Mode::Frame, b"\xC0one\xC0\xC0two\xC0".to_vec())]
    #[case::lossy(Mode::Lossy, b"one\ntwo\n".to_vec())]
    #[tokio::test]
    async fn pipe_drains_every_line(#[case] mode: Mode, #[case] expected: Vec<u8>) {
        let (out, stats) = pipe_lines(&b"one\ntwo\n"[..], Vec::new(), 128, mode, None)
            .await
            .expect("pipe succeeds");

        assert_eq!(out, expected);
        assert_eq!(stats.bytes, expected.len());
        assert_eq!(stats.sink_errors, 0);
    }

    #[tokio::test]
    async fn pipe_renders_hex() {
        let (HexSink(out), _) =
            pipe_lines(&b"A\n"[..], HexSink(Vec::new()), 128, Mode::Frame, None)
                .await
                .expect("pipe succeeds");

        assert_eq!(out, b"c041c0\n");
    }

    #[tokio::test]
    #[traced_test]
    async fn pipe_warns_about_lines_that_do_not_fit() {
        let input = b"far too long\nok\n";
        let (out, _) = pipe_lines(&input[..], Vec::new(), 8, Mode::Frame, None)
            .await
            .expect("pipe succeeds");

        assert_eq!(out, b"\xC0ok\xC0");
        assert!(logs_contain("line not queued"));
    }
}
