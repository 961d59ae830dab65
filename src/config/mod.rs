//! Configuration for buffer behavior.
//!
//! [`BufferConfig`] controls the two tunables of a
//! [`SegmentedBuffer`](crate::SegmentedBuffer):
//!
//! - `capacity` - upper bound on unconsumed-plus-incoming bytes per append
//! - `read_timeout` - how long a blocking read waits before failing
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use segstream::BufferConfig;
//!
//! // Custom capacity and timeout
//! let config = BufferConfig::new(64 * 1024, Duration::from_secs(5))?;
//!
//! // Builder pattern over the defaults
//! let config = BufferConfig::default()
//!     .with_read_timeout(Duration::from_millis(500));
//!
//! # Ok::<(), segstream::StreamError>(())
//! ```

use std::time::Duration;

use crate::error::StreamError;

/// Default maximum capacity (200 KiB).
pub const DEFAULT_CAPACITY: usize = 200 * 1024;

/// Default blocking-read timeout (20 seconds).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(20);

/// Configuration for a [`SegmentedBuffer`](crate::SegmentedBuffer).
///
/// The capacity bounds how far the producer may outpace the consumer: at
/// every append, unconsumed bytes plus the incoming block must fit within
/// it. Already-consumed bytes never count against the limit. The read
/// timeout bounds the total time a blocking read will wait for data or
/// termination before failing with
/// [`StreamError::ReadTimeout`](crate::StreamError::ReadTimeout).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use segstream::BufferConfig;
///
/// let config = BufferConfig::default()
///     .with_capacity(32 * 1024)
///     .with_read_timeout(Duration::from_secs(2));
/// assert_eq!(config.capacity(), 32 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferConfig {
    /// Maximum unconsumed-plus-incoming bytes accepted at any append.
    capacity: usize,

    /// Total wait budget for one blocking read call.
    read_timeout: Duration,
}

impl BufferConfig {
    /// Creates a new configuration with the given capacity and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidConfig`] if `capacity` is zero or
    /// `read_timeout` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use segstream::BufferConfig;
    ///
    /// let config = BufferConfig::new(4096, Duration::from_secs(1))?;
    /// assert_eq!(config.capacity(), 4096);
    /// # Ok::<(), segstream::StreamError>(())
    /// ```
    pub fn new(capacity: usize, read_timeout: Duration) -> Result<Self, StreamError> {
        if capacity == 0 {
            return Err(StreamError::InvalidConfig {
                message: "capacity must be non-zero",
            });
        }

        if read_timeout.is_zero() {
            return Err(StreamError::InvalidConfig {
                message: "read_timeout must be non-zero",
            });
        }

        Ok(Self {
            capacity,
            read_timeout,
        })
    }

    /// Sets the capacity.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`BufferConfig::validate`] to check if the configuration is valid.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the blocking-read timeout.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`BufferConfig::validate`] to check if the configuration is valid.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Returns the capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the blocking-read timeout.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use segstream::BufferConfig;
    ///
    /// let config = BufferConfig::default().with_capacity(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), StreamError> {
        Self::new(self.capacity, self.read_timeout).map(|_| ())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}
