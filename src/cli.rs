//! Command line interface for the `slipring` binary.
//!
//! The binary pushes stdin through a debug channel to stdout, or decodes a
//! framed stream back into one payload per line.

use clap::{Parser, Subcommand, ValueEnum};

/// Command line arguments for the `slipring` binary.
#[derive(Debug, Parser)]
#[command(name = "slipring", version, about = "Ring-buffered SLIP debug channel")]
pub struct Cli {
    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands understood by the binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read stdin line by line, queue it in a ring and drain it to stdout.
    Pipe {
        /// Ring storage length in bytes.
        #[arg(short, long, default_value_t = slipring::ring::DEFAULT_CAPACITY)]
        capacity: usize,
        /// How each line enters the ring.
        #[arg(short, long, value_enum, default_value_t = Mode::Frame)]
        mode: Mode,
        /// How drained bytes are written.
        #[arg(short, long, value_enum, default_value_t = Output::Raw)]
        output: Output,
        /// Drain poll interval in milliseconds; 0 relies on wakeups only.
        #[arg(long, default_value_t = 10)]
        poll_ms: u64,
    },
    /// Decode a framed stream from stdin and print one payload per line.
    Decode {
        /// Largest payload accepted before a frame is discarded.
        #[arg(long, default_value_t = 1024)]
        max_frame_length: usize,
        /// How decoded payloads are written.
        #[arg(short, long, value_enum, default_value_t = Output::Raw)]
        output: Output,
    },
}

/// Insertion path for `pipe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One all-or-nothing frame per line.
    Frame,
    /// Best-effort bytes, overwriting the oldest when full.
    Lossy,
}

/// Rendering of output bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Output {
    /// Bytes as they are.
    Raw,
    /// Lowercase hexadecimal.
    Hex,
}
