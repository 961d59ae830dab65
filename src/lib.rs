//! segstream
//!
//! A sequence of logical input streams multiplexed over one in-memory byte
//! buffer.
//!
//! `segstream` lets one thread continuously feed byte fragments (from a
//! non-blocking socket, a chunked source, a decoder) while another thread
//! consumes complete logical streams sequentially, including waiting for
//! data that has not arrived yet. The producer appends blocks and marks
//! finish points; the consumer reads to end-of-stream, then transparently
//! advances to the next stream without losing unread trailing data.
//!
//! The crate intentionally:
//! - does NOT persist anything
//! - does NOT fan out to multiple consumers (one cursor)
//! - does NOT apply backpressure beyond a hard capacity error
//!
//! It only does one thing: **append bytes in → drain streams out**
//!
//! # Producer / consumer
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use segstream::{BufferConfig, SegmentedBuffer, StreamError};
//!
//! fn main() -> Result<(), StreamError> {
//!     let buffer = Arc::new(SegmentedBuffer::new(BufferConfig::default()));
//!
//!     let producer = {
//!         let buffer = Arc::clone(&buffer);
//!         thread::spawn(move || -> Result<(), StreamError> {
//!             buffer.append("Hello")?;
//!             buffer.finish(true);
//!             buffer.append("World")?;
//!             buffer.finish(false);
//!             Ok(())
//!         })
//!     };
//!
//!     let mut streams = Vec::new();
//!     while buffer.has_more_streams() {
//!         let mut bytes = Vec::new();
//!         while let Some(byte) = buffer.read_byte()? {
//!             bytes.push(byte);
//!         }
//!         streams.push(bytes);
//!     }
//!     assert_eq!(streams, [b"Hello".to_vec(), b"World".to_vec()]);
//!
//!     producer.join().expect("producer panicked")?;
//!     Ok(())
//! }
//! ```
//!
//! # Non-blocking
//!
//! ```
//! use segstream::{BufferConfig, SegmentedBuffer};
//!
//! let buffer = SegmentedBuffer::new(BufferConfig::default());
//! buffer.configure_blocking(false);
//!
//! // No data and not finished: end-of-stream right away instead of waiting.
//! assert_eq!(buffer.read_byte()?, None);
//! # Ok::<(), segstream::StreamError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod config;
mod error;
mod source;

//
// Public surface (intentionally tiny)
//

pub use buffer::SegmentedBuffer;
pub use config::{BufferConfig, DEFAULT_CAPACITY, DEFAULT_READ_TIMEOUT};
pub use error::StreamError;
pub use source::CombinedRead;
