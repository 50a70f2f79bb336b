//! Fixed-capacity circular byte store.
//!
//! [`RingStore`] sits between code that emits diagnostic bytes and a slower
//! transport that drains them. It never allocates: the caller supplies the
//! backing storage once and the ring reuses it for the lifetime of the
//! owning channel.
//!
//! # Capacity
//!
//! One slot of the storage is always left unused so that an empty ring
//! (`head == tail`) can be told apart from a full one
//! (`(head + 1) % capacity == tail`) without a separate length field. A ring
//! built over `N` bytes therefore holds at most `N - 1` unread bytes; see
//! [`RingStore::usable_capacity`].
//!
//! # Writing
//!
//! Two insertion paths are provided:
//!
//! - [`RingStore::push_byte`] is lossy. When the ring is full the oldest unread byte is discarded to
//!   make room, so the ring always holds the most recent bytes.
//! - [`RingStore::reserve_write`] and [`RingStore::commit_write`] stage bytes ahead of `head` and
//!   publish them in one step. Framed writers use this pair to get all-or-nothing insertion (see
//!   [`crate::frame`]).
//!
//! # Reading
//!
//! [`RingStore::peek_contiguous`] borrows the longest run of unread bytes that
//! does not cross the physical end of the storage. Consumers hand that slice to
//! the transport and then call [`RingStore::advance_tail`]. Because the unread
//! region may wrap, draining is a loop that ends when the peeked span is empty:
//!
//! ```
//! use slipring::ring::RingStore;
//!
//! let mut ring = RingStore::new([0_u8; 8]).expect("capacity is valid");
//! for byte in b"hello" {
//!     ring.push_byte(*byte);
//! }
//!
//! let mut out = Vec::new();
//! loop {
//!     let span = ring.peek_contiguous();
//!     if span.is_empty() {
//!         break;
//!     }
//!     out.extend_from_slice(span);
//!     let consumed = span.len();
//!     ring.advance_tail(consumed).expect("span was just peeked");
//! }
//! assert_eq!(out, b"hello");
//! ```

mod error;

pub use error::RingError;

/// Smallest storage length a ring accepts.
///
/// With one slot reserved for the full/empty distinction, two bytes of
/// storage give a usable capacity of one.
pub const MIN_CAPACITY: usize = 2;

/// Storage length used by [`crate::channel::ChannelBuilder`] when none is given.
pub const DEFAULT_CAPACITY: usize = 128;

static_assertions::const_assert!(DEFAULT_CAPACITY >= MIN_CAPACITY);

/// Circular byte store over caller-supplied storage.
///
/// `S` is any owned or borrowed byte buffer, for example `[u8; 128]`,
/// `&'static mut [u8]` or `Vec<u8>`. Its length becomes the ring's capacity
/// and never changes afterwards.
///
/// Invariants:
///
/// - `head < capacity` and `tail < capacity`.
/// - `head == tail` exactly when the ring is empty.
/// - At most `capacity - 1` bytes are unread at any time.
#[derive(Debug, Clone)]
pub struct RingStore<S> {
    storage: S,
    capacity: usize,
    head: usize,
    tail: usize,
}

impl<S> RingStore<S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Bind a new, empty ring to `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::InvalidCapacity`] if `storage` is shorter than
    /// [`MIN_CAPACITY`].
    pub fn new(storage: S) -> Result<Self, RingError> {
        let capacity = storage.as_ref().len();
        if capacity < MIN_CAPACITY {
            return Err(RingError::InvalidCapacity {
                capacity,
                min: MIN_CAPACITY,
            });
        }
        Ok(Self {
            storage,
            capacity,
            head: 0,
            tail: 0,
        })
    }

    /// Length of the backing storage.
    #[must_use]
    pub fn capacity(&self) -> usize { self.capacity }

    /// Maximum number of unread bytes the ring can hold.
    #[must_use]
    pub fn usable_capacity(&self) -> usize { self.capacity - 1 }

    /// Number of unread bytes.
    #[must_use]
    pub fn len(&self) -> usize { (self.head + self.capacity - self.tail) % self.capacity }

    /// Returns `true` when there is nothing to read.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.head == self.tail }

    /// Returns `true` when no byte can be added without discarding one.
    #[must_use]
    pub fn is_full(&self) -> bool { self.wrap(self.head + 1) == self.tail }

    /// Number of bytes that can be written before the ring is full.
    #[must_use]
    pub fn space_left(&self) -> usize {
        (self.tail + self.capacity - self.head - 1) % self.capacity
    }

    /// Append one byte, discarding the oldest unread byte if the ring is full.
    ///
    /// This is the best-effort path for informational output. It never fails
    /// and never applies backpressure: once the ring is full every new byte
    /// pushes the oldest one out, so the readable content is always the most
    /// recent [`usable_capacity`](Self::usable_capacity) bytes.
    pub fn push_byte(&mut self, byte: u8) {
        if self.is_full() {
            self.tail = self.wrap(self.tail + 1);
        }
        let head = self.head;
        self.storage.as_mut()[head] = byte;
        self.head = self.wrap(head + 1);
    }

    /// Stage `byte` at `offset` positions past `head` without publishing it.
    ///
    /// Staged bytes are invisible to readers until
    /// [`commit_write`](Self::commit_write) moves `head` over them.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::StagingOverrun`] if `offset` lies outside the free
    /// region, where the write would clobber unread bytes.
    pub fn reserve_write(&mut self, offset: usize, byte: u8) -> Result<(), RingError> {
        let available = self.space_left();
        if offset >= available {
            return Err(RingError::StagingOverrun { offset, available });
        }
        let index = self.wrap(self.head + offset);
        self.storage.as_mut()[index] = byte;
        Ok(())
    }

    /// Publish `count` staged bytes by advancing `head`.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::InvalidCommit`] if `count` exceeds
    /// [`space_left`](Self::space_left). `head` is left unchanged.
    pub fn commit_write(&mut self, count: usize) -> Result<(), RingError> {
        let available = self.space_left();
        if count > available {
            return Err(RingError::InvalidCommit { count, available });
        }
        self.head = self.wrap(self.head + count);
        Ok(())
    }

    /// Borrow the unread bytes from `tail` up to `head` or the end of the
    /// storage, whichever comes first.
    ///
    /// Returns an empty slice when the ring is empty. When the unread region
    /// wraps, a second call after [`advance_tail`](Self::advance_tail) returns
    /// the remainder from the start of the storage.
    #[must_use]
    pub fn peek_contiguous(&self) -> &[u8] {
        let end = if self.head < self.tail {
            self.capacity
        } else {
            self.head
        };
        &self.storage.as_ref()[self.tail..end]
    }

    /// Mark `count` bytes from the last peeked span as consumed.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::AdvancePastHead`] if `count` is longer than the
    /// span [`peek_contiguous`](Self::peek_contiguous) currently returns.
    pub fn advance_tail(&mut self, count: usize) -> Result<(), RingError> {
        let available = self.peek_contiguous().len();
        if count > available {
            return Err(RingError::AdvancePastHead { count, available });
        }
        self.tail = self.wrap(self.tail + count);
        Ok(())
    }

    /// Discard every unread byte.
    pub fn clear(&mut self) { self.tail = self.head; }

    fn wrap(&self, index: usize) -> usize { index % self.capacity }
}
