//! [`ByteSink`] implementations for observing drains.

use std::{
    io,
    sync::{Arc, Mutex},
};

use slipring::channel::ByteSink;

/// Sink that appends every span to a shared buffer.
///
/// Clones share the buffer, so a test can keep one clone while a
/// [`DrainTask`](slipring::drain::DrainTask) owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    bytes: Arc<Mutex<Vec<u8>>>,
    spans: Arc<Mutex<usize>>,
    finishes: Arc<Mutex<usize>>,
}

impl RecordingSink {
    /// Copy of everything written so far.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> { self.bytes.lock().expect("sink poisoned").clone() }

    /// Number of spans written.
    #[must_use]
    pub fn spans(&self) -> usize { *self.spans.lock().expect("sink poisoned") }

    /// Number of times the drain finished a pass.
    #[must_use]
    pub fn finishes(&self) -> usize { *self.finishes.lock().expect("sink poisoned") }
}

impl ByteSink for RecordingSink {
    fn write_span(&mut self, span: &[u8]) -> io::Result<()> {
        self.bytes
            .lock()
            .expect("sink poisoned")
            .extend_from_slice(span);
        *self.spans.lock().expect("sink poisoned") += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        *self.finishes.lock().expect("sink poisoned") += 1;
        Ok(())
    }
}

/// Sink that fails its first `failures` span writes, then records like
/// [`RecordingSink`].
#[derive(Debug, Clone, Default)]
pub struct FailingSink {
    failures: Arc<Mutex<usize>>,
    inner: RecordingSink,
}

impl FailingSink {
    /// Create a sink that refuses the next `failures` spans.
    #[must_use]
    pub fn new(failures: usize) -> Self {
        Self {
            failures: Arc::new(Mutex::new(failures)),
            inner: RecordingSink::default(),
        }
    }

    /// Bytes accepted after the failures ran out.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> { self.inner.bytes() }

    /// Failures still to come.
    #[must_use]
    pub fn remaining_failures(&self) -> usize { *self.failures.lock().expect("sink poisoned") }
}

impl ByteSink for FailingSink {
    fn write_span(&mut self, span: &[u8]) -> io::Result<()> {
        {
            let mut failures = self.failures.lock().expect("sink poisoned");
            if *failures > 0 {
                *failures -= 1;
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink unavailable"));
            }
        }
        self.inner.write_span(span)
    }

    fn finish(&mut self) -> io::Result<()> { self.inner.finish() }
}
