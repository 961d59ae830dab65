//! The capability contract for multiplexed byte sources.
//!
//! [`CombinedRead`] is the small interface a consumer codes against: a byte
//! source that is really a sequence of logical input streams. Reading drains
//! the current stream to end-of-stream, [`CombinedRead::has_more_streams`]
//! says whether another one follows, and the next read cycle picks it up.
//! [`SegmentedBuffer`](crate::SegmentedBuffer) is the one implementation in
//! this crate.

use crate::error::StreamError;

/// A byte source multiplexing a sequence of logical input streams.
///
/// End-of-stream is reported as `Ok(None)`; it marks the end of the
/// *current* logical stream, not of the source. The consumer loop is:
///
/// ```text
/// while source.has_more_streams() {
///     while let Some(byte) = source.read_byte()? {
///         // one logical stream
///     }
/// }
/// ```
///
/// All methods take `&self`: implementations synchronize internally and are
/// meant to be shared between a producer and a consumer thread.
pub trait CombinedRead {
    /// Reads one byte from the current stream.
    ///
    /// Returns `Ok(None)` at the end of the current stream. In blocking
    /// mode the call waits for data up to the implementation's timeout.
    ///
    /// # Errors
    ///
    /// [`StreamError::ReadTimeout`] if the wait budget elapses with no data
    /// and no termination.
    fn read_byte(&self) -> Result<Option<u8>, StreamError>;

    /// Reads up to `len` bytes into `dest[offset..offset + len]`.
    ///
    /// Returns the number of bytes copied, or `Ok(None)` at the end of the
    /// current stream. A return of `Ok(Some(0))` only happens when `len`
    /// clamps to zero and is not end-of-stream.
    ///
    /// # Errors
    ///
    /// [`StreamError::InvalidArgument`] if `offset`/`len` do not fit in
    /// `dest`; this is checked before any blocking. Otherwise the same
    /// errors as [`CombinedRead::read_byte`].
    fn read_into(
        &self,
        dest: &mut [u8],
        offset: usize,
        len: usize,
    ) -> Result<Option<usize>, StreamError>;

    /// Skips up to `n` bytes within the current stream.
    ///
    /// Returns the number actually skipped; never crosses into the next
    /// stream's data.
    fn skip(&self, n: u64) -> u64;

    /// Returns `true` while at least one more logical stream is available
    /// or could still be produced.
    fn has_more_streams(&self) -> bool;

    /// Abandons the remainder of the current stream and advances to the
    /// next one.
    fn skip_current_stream(&self);

    /// Asserts that the cursor sits at the start of a fresh stream.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotAtStreamStart`] if any bytes of the current
    /// stream were already consumed.
    fn assert_new_stream(&self) -> Result<(), StreamError>;

    /// Toggles between blocking reads (wait for data up to the timeout)
    /// and non-blocking reads (immediate end-of-stream when no data is
    /// available).
    fn configure_blocking(&self, blocking: bool);
}
