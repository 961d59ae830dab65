//! Error types for segstream.

use std::fmt;
use std::time::Duration;

/// Errors raised by [`SegmentedBuffer`](crate::SegmentedBuffer) operations.
#[derive(Debug)]
pub enum StreamError {
    /// `append` was called after the buffer was terminally finished.
    AlreadyFinished,

    /// An append would push the unconsumed backlog past the configured capacity.
    BufferFull {
        /// Unconsumed bytes plus the incoming append.
        pending: usize,
        /// The configured maximum.
        capacity: usize,
    },

    /// A blocking read waited past the configured timeout with no new data
    /// and no termination.
    ReadTimeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// Malformed read-into-buffer parameters.
    InvalidArgument {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// `assert_new_stream` was called while the cursor was mid-stream.
    NotAtStreamStart {
        /// The cursor position at the time of the call.
        pos: usize,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::AlreadyFinished => {
                write!(f, "stream is already finished")
            }
            StreamError::BufferFull { pending, capacity } => {
                write!(
                    f,
                    "buffer full: {} bytes pending (capacity {})",
                    pending, capacity
                )
            }
            StreamError::ReadTimeout { timeout } => {
                write!(f, "read timed out after {:?}", timeout)
            }
            StreamError::InvalidArgument { message } => {
                write!(f, "invalid argument: {}", message)
            }
            StreamError::NotAtStreamStart { pos } => {
                write!(f, "not at the start of a new stream (pos {})", pos)
            }
            StreamError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
        }
    }
}

impl std::error::Error for StreamError {}
