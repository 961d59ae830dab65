//! Unsynchronized segment bookkeeping over an immutable byte snapshot.
//!
//! Everything here runs under the lock held by
//! [`SegmentedBuffer`](crate::SegmentedBuffer); no field is touched without
//! it. The backing store is a [`Bytes`] snapshot replaced wholesale on every
//! append and every compaction, never mutated in place.

use std::collections::VecDeque;

use bytes::Bytes;

use crate::error::StreamError;

/// Cursor, read limit, and boundary queue over the backing store.
///
/// Field invariants, observable between calls:
/// - `pos <= read_limit <= buf.len()`
/// - `boundaries` is strictly increasing, every entry `<= buf.len()`
/// - when `boundaries` is non-empty, `read_limit == boundaries[0]`
#[derive(Debug)]
pub(crate) struct BufferState {
    /// Backing store. Holds only unconsumed bytes plus the not-yet-read
    /// tail of the current append coordinate frame.
    buf: Bytes,
    /// Consumer read cursor.
    pos: usize,
    /// Offset up to which the consumer may read without blocking.
    read_limit: usize,
    /// End offsets of completed-but-unconsumed streams, FIFO.
    boundaries: VecDeque<usize>,
    /// Terminal flag: no appends and no new boundaries ever again.
    finished: bool,
    /// Whether reads wait for data or return end-of-stream immediately.
    blocking: bool,
}

impl BufferState {
    pub(crate) fn new() -> Self {
        Self {
            buf: Bytes::new(),
            pos: 0,
            read_limit: 0,
            boundaries: VecDeque::new(),
            finished: false,
            blocking: true,
        }
    }

    /// Seeds the store with already-appended, unsegmented data.
    pub(crate) fn with_initial(data: Bytes) -> Self {
        let read_limit = data.len();
        Self {
            buf: data,
            pos: 0,
            read_limit,
            boundaries: VecDeque::new(),
            finished: false,
            blocking: true,
        }
    }

    /// Appends `data`, discarding the consumed prefix `[0, pos)`.
    ///
    /// The only point where stale consumed bytes are physically dropped;
    /// reading never shrinks the store. Capacity counts unconsumed tail
    /// plus incoming, never lifetime volume.
    pub(crate) fn append(&mut self, data: Bytes, capacity: usize) -> Result<(), StreamError> {
        if self.finished {
            return Err(StreamError::AlreadyFinished);
        }

        let available = self.buf.len() - self.pos;
        let new_size = available + data.len();
        if new_size > capacity {
            return Err(StreamError::BufferFull {
                pending: new_size,
                capacity,
            });
        }

        if available == 0 {
            // Nothing to retain, take the incoming block as-is.
            self.buf = data;
        } else {
            let mut next = Vec::with_capacity(new_size);
            next.extend_from_slice(&self.buf[self.pos..]);
            next.extend_from_slice(&data);
            self.buf = Bytes::from(next);
        }

        // Queued boundaries move into the new coordinate frame. An offset
        // landing on zero is a fully-consumed stream whose transition is
        // still pending, so it stays queued.
        if self.pos > 0 {
            for boundary in self.boundaries.iter_mut() {
                *boundary -= self.pos;
            }
        }
        self.pos = 0;

        self.read_limit = match self.boundaries.front() {
            Some(&first) => first,
            None => self.buf.len(),
        };
        Ok(())
    }

    /// Closes the current stream at the present tail.
    ///
    /// With `mark_only` false the buffer becomes terminally finished.
    /// An empty stream (two finishes with no intervening append, or a
    /// finish on an empty store) records no boundary.
    pub(crate) fn finish(&mut self, mark_only: bool) {
        if self.boundaries.is_empty() {
            self.read_limit = self.buf.len();
        }
        let end = self.buf.len();
        if end > 0 && self.boundaries.back() != Some(&end) {
            self.boundaries.push_back(end);
        }
        if !mark_only {
            self.finished = true;
        }
    }

    /// True when the current stream has been drained.
    ///
    /// Exhaustion against a queued boundary compacts the store and rebases
    /// the cursor as a side effect; exhaustion via finished-and-no-boundaries
    /// leaves everything untouched (nothing left to read, ever).
    pub(crate) fn current_stream_exhausted(&mut self) -> bool {
        if let Some(&first) = self.boundaries.front() {
            if self.pos >= first {
                self.shrink_to_next_stream();
                return true;
            }
            return false;
        }
        self.finished
    }

    /// Drops the consumed prefix and advances to the next stream.
    fn shrink_to_next_stream(&mut self) {
        let dropped = self.pos;
        self.buf = Bytes::copy_from_slice(&self.buf[dropped..]);

        let mut rebased = VecDeque::with_capacity(self.boundaries.len().saturating_sub(1));
        for &boundary in &self.boundaries {
            if boundary > dropped {
                rebased.push_back(boundary - dropped);
            }
        }
        self.boundaries = rebased;

        self.read_limit = match self.boundaries.front() {
            Some(&first) => first,
            None => self.buf.len(),
        };
        self.pos = 0;
    }

    /// True when a byte can be taken without blocking.
    pub(crate) fn readable(&self) -> bool {
        self.pos < self.read_limit
    }

    /// Takes the byte at the cursor. Caller checks `readable` first.
    pub(crate) fn take_byte(&mut self) -> u8 {
        let byte = self.buf[self.pos];
        self.pos += 1;
        byte
    }

    /// Copies up to `len` readable bytes into `dest[offset..]`, returning
    /// the count. Bounds were validated by the caller.
    pub(crate) fn copy_into(&mut self, dest: &mut [u8], offset: usize, len: usize) -> usize {
        let count = len.min(self.read_limit - self.pos);
        if count > 0 {
            dest[offset..offset + count].copy_from_slice(&self.buf[self.pos..self.pos + count]);
            self.pos += count;
        }
        count
    }

    /// Advances the cursor by up to `n`, clamped to the current stream.
    /// Landing exactly on the boundary does not transition; the next read
    /// discovers that.
    pub(crate) fn skip(&mut self, n: u64) -> u64 {
        let remaining = (self.read_limit - self.pos) as u64;
        let skipped = n.min(remaining);
        self.pos += skipped as usize;
        skipped
    }

    /// Abandons the rest of the current stream and forces the transition,
    /// whether or not the stream was actually exhausted.
    pub(crate) fn skip_current_stream(&mut self) {
        self.pos = self.read_limit;
        self.shrink_to_next_stream();
    }

    pub(crate) fn has_more_streams(&self) -> bool {
        !self.boundaries.is_empty() || !self.finished
    }

    pub(crate) fn assert_new_stream(&self) -> Result<(), StreamError> {
        if self.pos != 0 {
            return Err(StreamError::NotAtStreamStart { pos: self.pos });
        }
        Ok(())
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn blocking(&self) -> bool {
        self.blocking
    }

    pub(crate) fn set_blocking(&mut self, blocking: bool) {
        self.blocking = blocking;
    }

    /// Bytes readable without blocking: `read_limit - pos`.
    pub(crate) fn available(&self) -> usize {
        self.read_limit - self.pos
    }

    /// Physical size of the backing store.
    pub(crate) fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Back to the initial empty, non-finished state. The blocking flag
    /// is left as configured.
    pub(crate) fn reset(&mut self) {
        self.buf = Bytes::new();
        self.pos = 0;
        self.read_limit = 0;
        self.boundaries.clear();
        self.finished = false;
    }
}
