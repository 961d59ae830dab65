//! Two threads sharing one buffer: a producer feeding socket-style
//! fragments, a consumer draining complete messages with blocking reads.
//!
//! Run with:
//!     cargo run --example producer_consumer

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use segstream::{BufferConfig, SegmentedBuffer, StreamError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let buffer = Arc::new(SegmentedBuffer::new(BufferConfig::default()));

    let producer = {
        let buffer = Arc::clone(&buffer);
        thread::spawn(move || -> Result<(), StreamError> {
            let messages = ["first message", "second message", "third"];
            for (i, message) in messages.iter().enumerate() {
                // Arrive in small fragments with gaps, like a slow peer.
                for fragment in message.as_bytes().chunks(4) {
                    buffer.append(fragment.to_vec())?;
                    thread::sleep(Duration::from_millis(20));
                }
                buffer.finish(i + 1 < messages.len());
            }
            Ok(())
        })
    };

    let mut count = 0;
    while buffer.has_more_streams() {
        let mut bytes = Vec::new();
        while let Some(byte) = buffer.read_byte()? {
            bytes.push(byte);
        }
        count += 1;
        println!("message {}: {:?}", count, String::from_utf8_lossy(&bytes));
    }

    producer.join().expect("producer panicked")?;
    println!("done: {} messages", count);
    Ok(())
}
