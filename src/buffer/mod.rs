//! The segmented buffer - one producer appending, one consumer draining.
//!
//! This module implements the crate's single component:
//!
//! - [`SegmentedBuffer`] - growable byte store multiplexing logical streams
//! - `append()` / `finish()` - the producer side
//! - `read_byte()` / `read_into()` / `skip()` - the consumer side
//!
//! Every operation funnels through one mutex; blocking reads park on a
//! condition variable that `append` and `finish` signal.
//!
//! # Example
//!
//! ```
//! use segstream::{BufferConfig, SegmentedBuffer};
//!
//! let buffer = SegmentedBuffer::new(BufferConfig::default());
//! buffer.append("Hello")?;
//! buffer.finish(true);
//! buffer.append("World")?;
//! buffer.finish(false);
//!
//! while buffer.has_more_streams() {
//!     while let Some(byte) = buffer.read_byte()? {
//!         print!("{}", byte as char);
//!     }
//! }
//! # Ok::<(), segstream::StreamError>(())
//! ```

mod state;

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use bytes::Bytes;

use crate::config::BufferConfig;
use crate::error::StreamError;
use crate::source::CombinedRead;
use state::BufferState;

/// What a read call found once the wait loop settled.
enum ReadReady {
    /// At least one byte is readable below the current read limit.
    Data,
    /// The current stream is exhausted; the call reports end-of-stream.
    EndOfStream,
}

/// A growable byte buffer multiplexing a sequence of logical input streams.
///
/// One producer thread appends byte blocks and marks finish points; one
/// consumer thread reads bytes until end-of-stream, checks
/// [`has_more_streams`](SegmentedBuffer::has_more_streams), and starts the
/// next read cycle. Boundaries are consumed strictly in declaration order,
/// and bytes become visible only in append order.
///
/// # Blocking
///
/// In blocking mode (the default) a read with no available data parks until
/// the producer appends or finishes, bounded by one total deadline per call
/// (see [`BufferConfig::read_timeout`]); past the deadline the read fails
/// with [`StreamError::ReadTimeout`], a hard error the buffer never retries.
/// With blocking disabled, such a read reports end-of-stream immediately.
///
/// # Capacity
///
/// Each append is checked against `unconsumed + incoming`; consumed bytes
/// never count. A producer outrunning the consumer by more than the
/// configured capacity within the open stream gets
/// [`StreamError::BufferFull`]. The store itself holds only unconsumed
/// bytes: the consumed prefix is dropped on every append and on every
/// stream transition, so memory stays bounded by capacity rather than by
/// lifetime volume.
///
/// # Example
///
/// ```
/// use segstream::{BufferConfig, SegmentedBuffer};
///
/// let buffer = SegmentedBuffer::new(BufferConfig::default());
/// buffer.append("Hello")?;
/// buffer.finish(true);
/// buffer.append("World")?;
/// buffer.finish(true);
/// buffer.append("!!")?;
/// buffer.finish(false);
///
/// let mut streams = Vec::new();
/// while buffer.has_more_streams() {
///     let mut bytes = Vec::new();
///     while let Some(byte) = buffer.read_byte()? {
///         bytes.push(byte);
///     }
///     streams.push(String::from_utf8(bytes).unwrap());
/// }
/// assert_eq!(streams, ["Hello", "World", "!!"]);
/// # Ok::<(), segstream::StreamError>(())
/// ```
#[derive(Debug)]
pub struct SegmentedBuffer {
    state: Mutex<BufferState>,
    data_ready: Condvar,
    config: BufferConfig,
}

impl SegmentedBuffer {
    /// Creates an empty buffer with the given configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use segstream::{BufferConfig, SegmentedBuffer};
    ///
    /// let buffer = SegmentedBuffer::new(BufferConfig::default());
    /// assert!(buffer.has_more_streams());
    /// ```
    pub fn new(config: BufferConfig) -> Self {
        Self {
            state: Mutex::new(BufferState::new()),
            data_ready: Condvar::new(),
            config,
        }
    }

    /// Creates a buffer pre-seeded with an initial byte block.
    ///
    /// The block is treated as already appended, unsegmented data: readable
    /// right away, not yet closed by any finish point.
    ///
    /// # Example
    ///
    /// ```
    /// use segstream::{BufferConfig, SegmentedBuffer};
    ///
    /// let buffer = SegmentedBuffer::with_initial("seed", BufferConfig::default());
    /// assert_eq!(buffer.available(), 4);
    /// ```
    pub fn with_initial(data: impl Into<Bytes>, config: BufferConfig) -> Self {
        Self {
            state: Mutex::new(BufferState::with_initial(data.into())),
            data_ready: Condvar::new(),
            config,
        }
    }

    /// Appends a byte block to the open stream.
    ///
    /// The store is rebuilt as unconsumed tail plus the new bytes; the
    /// already-consumed prefix is dropped here. When no finish point is
    /// queued, the appended bytes become readable immediately as part of
    /// the open stream. Wakes any blocked reader.
    ///
    /// # Errors
    ///
    /// - [`StreamError::AlreadyFinished`] after a terminal
    ///   [`finish`](SegmentedBuffer::finish)
    /// - [`StreamError::BufferFull`] when `unconsumed + incoming` would
    ///   exceed the configured capacity (exactly `== capacity` is accepted)
    pub fn append(&self, data: impl Into<Bytes>) -> Result<(), StreamError> {
        let mut state = self.lock();
        state.append(data.into(), self.config.capacity())?;
        self.data_ready.notify_all();
        Ok(())
    }

    /// Marks the end of the current stream.
    ///
    /// With `mark_only == true`, data appended afterwards belongs to a new
    /// logical stream; each such call with intervening appends yields one
    /// more stream. With `mark_only == false` the buffer is terminally
    /// finished: queued streams can still be drained, but no append will
    /// ever be accepted again. Wakes any blocked reader.
    pub fn finish(&self, mark_only: bool) {
        let mut state = self.lock();
        state.finish(mark_only);
        self.data_ready.notify_all();
    }

    /// Reads one byte from the current stream.
    ///
    /// Returns `Ok(None)` at end-of-stream. Reaching a queued finish point
    /// compacts the store and rebases the cursor before reporting it; the
    /// caller detects stream completion, checks
    /// [`has_more_streams`](SegmentedBuffer::has_more_streams), and begins
    /// a fresh read cycle.
    ///
    /// # Errors
    ///
    /// [`StreamError::ReadTimeout`] when a blocking wait outlives the
    /// configured timeout.
    pub fn read_byte(&self) -> Result<Option<u8>, StreamError> {
        let state = self.lock();
        let (mut state, ready) = self.await_readable(state)?;
        match ready {
            ReadReady::Data => Ok(Some(state.take_byte())),
            ReadReady::EndOfStream => Ok(None),
        }
    }

    /// Reads up to `len` bytes into `dest[offset..offset + len]`.
    ///
    /// Returns `Ok(Some(count))` with the number of bytes copied, clamped
    /// to the current stream, or `Ok(None)` at end-of-stream.
    /// `Ok(Some(0))` occurs only when `len` clamps to zero and must not be
    /// taken for end-of-stream.
    ///
    /// # Errors
    ///
    /// [`StreamError::InvalidArgument`] when `offset`/`len` do not fit in
    /// `dest` - checked before any blocking, in either mode. Otherwise the
    /// same errors as [`read_byte`](SegmentedBuffer::read_byte).
    pub fn read_into(
        &self,
        dest: &mut [u8],
        offset: usize,
        len: usize,
    ) -> Result<Option<usize>, StreamError> {
        if offset > dest.len() {
            return Err(StreamError::InvalidArgument {
                message: "offset exceeds destination length",
            });
        }
        if len > dest.len() - offset {
            return Err(StreamError::InvalidArgument {
                message: "length exceeds destination capacity",
            });
        }

        let state = self.lock();
        let (mut state, ready) = self.await_readable(state)?;
        match ready {
            ReadReady::Data => Ok(Some(state.copy_into(dest, offset, len))),
            ReadReady::EndOfStream => Ok(None),
        }
    }

    /// Skips up to `n` bytes within the current stream.
    ///
    /// The count is clamped to the bytes remaining before the next finish
    /// point and the actual number skipped is returned. Landing exactly on
    /// the finish point does not transition streams; the next read does.
    pub fn skip(&self, n: u64) -> u64 {
        self.lock().skip(n)
    }

    /// Abandons the remainder of the current stream.
    ///
    /// Jumps the cursor to the read limit and forces the compaction
    /// transition, whether or not the stream was exhausted.
    pub fn skip_current_stream(&self) {
        self.lock().skip_current_stream();
    }

    /// Returns `true` while at least one completed stream is queued or the
    /// producer could still extend the current one. Returns `false` only
    /// in the terminal state: finished with every stream drained.
    pub fn has_more_streams(&self) -> bool {
        self.lock().has_more_streams()
    }

    /// Asserts that the cursor sits at the start of a fresh stream.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotAtStreamStart`] when bytes of the current stream
    /// were already consumed.
    pub fn assert_new_stream(&self) -> Result<(), StreamError> {
        self.lock().assert_new_stream()
    }

    /// Toggles blocking reads on or off for all subsequent reads.
    pub fn configure_blocking(&self, blocking: bool) {
        self.lock().set_blocking(blocking);
    }

    /// Reports whether the buffer was terminally finished.
    pub fn is_finished(&self) -> bool {
        self.lock().is_finished()
    }

    /// Returns the fixed maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Returns the total wait budget of one blocking read call.
    pub fn read_timeout(&self) -> std::time::Duration {
        self.config.read_timeout()
    }

    /// Returns the configuration this buffer was built with.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Bytes readable from the current stream without blocking.
    pub fn available(&self) -> usize {
        self.lock().available()
    }

    /// Physical size of the backing store (unconsumed bytes only, after
    /// any compaction).
    pub fn buffered_len(&self) -> usize {
        self.lock().buffered_len()
    }

    /// Clears data, cursor, finish points, and the terminal flag back to
    /// the initial empty state.
    ///
    /// Not safe to call while another thread is blocked inside a read: the
    /// waiter would resume against the emptied state and misreport
    /// end-of-stream or time out.
    pub fn reset(&self) {
        self.lock().reset();
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        // A poisoned lock only means a peer panicked mid-call; the state
        // itself is updated in place consistently, so keep going.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The wait loop shared by both read paths.
    ///
    /// One deadline bounds the whole call: every wake re-checks
    /// readability, then exhaustion (which compacts when a finish point
    /// was reached), then the blocking flag, and parks again only for the
    /// time remaining.
    fn await_readable<'a>(
        &'a self,
        mut state: MutexGuard<'a, BufferState>,
    ) -> Result<(MutexGuard<'a, BufferState>, ReadReady), StreamError> {
        let timeout = self.config.read_timeout();
        let deadline = Instant::now() + timeout;
        loop {
            if state.readable() {
                return Ok((state, ReadReady::Data));
            }
            if state.current_stream_exhausted() {
                return Ok((state, ReadReady::EndOfStream));
            }
            if !state.blocking() {
                return Ok((state, ReadReady::EndOfStream));
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(StreamError::ReadTimeout { timeout });
            }
            let (guard, _) = self
                .data_ready
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
    }
}

impl Default for SegmentedBuffer {
    fn default() -> Self {
        Self::new(BufferConfig::default())
    }
}

impl CombinedRead for SegmentedBuffer {
    fn read_byte(&self) -> Result<Option<u8>, StreamError> {
        SegmentedBuffer::read_byte(self)
    }

    fn read_into(
        &self,
        dest: &mut [u8],
        offset: usize,
        len: usize,
    ) -> Result<Option<usize>, StreamError> {
        SegmentedBuffer::read_into(self, dest, offset, len)
    }

    fn skip(&self, n: u64) -> u64 {
        SegmentedBuffer::skip(self, n)
    }

    fn has_more_streams(&self) -> bool {
        SegmentedBuffer::has_more_streams(self)
    }

    fn skip_current_stream(&self) {
        SegmentedBuffer::skip_current_stream(self)
    }

    fn assert_new_stream(&self) -> Result<(), StreamError> {
        SegmentedBuffer::assert_new_stream(self)
    }

    fn configure_blocking(&self, blocking: bool) {
        SegmentedBuffer::configure_blocking(self, blocking)
    }
}
