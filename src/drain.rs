//! Background task that moves bytes from a channel to a transport.
//!
//! [`DrainTask`] repeatedly drains a [`DebugChannel`] into a [`ByteSink`] and
//! then sleeps until one of three things happens:
//!
//! - a producer writes to the channel and wakes it,
//! - the optional poll interval elapses,
//! - the [`CancellationToken`] is cancelled.
//!
//! On cancellation the task drains one last time so nothing already
//! accepted by the channel is left behind, then returns the sink.
//!
//! Sink failures are logged and the task carries on; the bytes stay in the
//! ring and are offered again on the next pass. Retry and backoff beyond that
//! belong to the transport.

use std::{sync::Arc, time::Duration};

use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::channel::{ByteSink, ChannelConfigError, DebugChannel, DrainError};

/// Poll interval used by [`DrainTask::new`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

static_assertions::const_assert!(DEFAULT_POLL_INTERVAL.as_nanos() > 0);

/// Summary returned when a [`DrainTask`] stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Bytes written to the sink.
    pub bytes: usize,
    /// Drain passes that wrote at least one byte.
    pub passes: usize,
    /// Drain passes that failed in the sink.
    pub sink_errors: usize,
}

/// Drain loop for one channel and one sink.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use slipring::{channel::DebugChannel, drain::DrainTask};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let channel = Arc::new(DebugChannel::builder().build().expect("valid configuration"));
/// let shutdown = CancellationToken::new();
/// let task = tokio::spawn(DrainTask::new(channel.clone(), Vec::new()).run(shutdown.clone()));
///
/// channel.encode_frame(b"boot").expect("frame fits");
/// shutdown.cancel();
///
/// let (sink, stats) = task.await.expect("drain task panicked");
/// assert_eq!(sink, b"\xC0boot\xC0");
/// assert_eq!(stats.bytes, 6);
/// # }
/// ```
pub struct DrainTask<S, K> {
    channel: Arc<DebugChannel<S>>,
    sink: K,
    poll_interval: Option<Duration>,
    stats: DrainStats,
}

impl<S, K> DrainTask<S, K>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
    K: ByteSink,
{
    /// Create a task polling every [`DEFAULT_POLL_INTERVAL`] in addition to
    /// producer wakeups.
    #[must_use]
    pub fn new(channel: Arc<DebugChannel<S>>, sink: K) -> Self {
        Self {
            channel,
            sink,
            poll_interval: Some(DEFAULT_POLL_INTERVAL),
            stats: DrainStats::default(),
        }
    }

    /// Change the poll interval. `None` relies on producer wakeups alone.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelConfigError::InvalidPollInterval`] for a zero
    /// interval.
    pub fn poll_interval(mut self, interval: Option<Duration>) -> Result<Self, ChannelConfigError> {
        if interval.is_some_and(|d| d.is_zero()) {
            return Err(ChannelConfigError::InvalidPollInterval);
        }
        self.poll_interval = interval;
        Ok(self)
    }

    /// Run one drain pass and update the statistics.
    fn pass(&mut self) {
        match self.channel.drain(&mut self.sink) {
            Ok(0) => {}
            Ok(bytes) => {
                self.stats.bytes += bytes;
                self.stats.passes += 1;
                debug!(bytes, "drained debug channel");
            }
            Err(err) => {
                self.stats.bytes += err.drained();
                self.stats.sink_errors += 1;
                log_failure(&err);
            }
        }
    }

    /// Drive the loop until `shutdown` is cancelled.
    ///
    /// Returns the sink together with the accumulated statistics.
    pub async fn run(mut self, shutdown: CancellationToken) -> (K, DrainStats) {
        let mut ticker = self.poll_interval.map(|period| {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            self.pass();

            let channel = Arc::clone(&self.channel);
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                () = channel.notified() => {}
                () = tick(ticker.as_mut()) => {}
            }
        }

        self.pass();
        debug!(
            bytes = self.stats.bytes,
            passes = self.stats.passes,
            sink_errors = self.stats.sink_errors,
            "drain task stopped"
        );
        (self.sink, self.stats)
    }
}

async fn tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn log_failure(err: &DrainError) {
    match err {
        DrainError::Sink { drained, source } => {
            warn!(drained, error = %source, "sink rejected debug output; will retry");
        }
        other => warn!(error = %other, "debug channel drain failed"),
    }
}

impl<S, K> std::fmt::Debug for DrainTask<S, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrainTask")
            .field("channel", &self.channel)
            .field("poll_interval", &self.poll_interval)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
