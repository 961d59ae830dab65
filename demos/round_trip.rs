//! Single-threaded round trip: three logical streams through one buffer.
//!
//! Run with:
//!     cargo run --example round_trip

use segstream::{BufferConfig, SegmentedBuffer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let buffer = SegmentedBuffer::new(BufferConfig::default());

    buffer.append("Hello")?;
    buffer.finish(true);
    buffer.append("World")?;
    buffer.finish(true);
    buffer.append("!!")?;
    buffer.finish(false);

    let mut index = 0;
    while buffer.has_more_streams() {
        index += 1;
        let mut dest = [0u8; 50];
        print!("stream {}: ", index);
        while let Some(count) = buffer.read_into(&mut dest, 0, 50)? {
            print!("{}", String::from_utf8_lossy(&dest[..count]));
        }
        println!();
    }

    println!("terminal: no more streams");
    Ok(())
}
