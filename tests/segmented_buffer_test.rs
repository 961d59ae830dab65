// Integration tests for the SegmentedBuffer producer/consumer API
// Tests cover: stream ordering, capacity accounting, compaction, blocking
// semantics, timeouts, and the two-thread round trip

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use segstream::{BufferConfig, SegmentedBuffer, StreamError};

fn quick_timeout() -> BufferConfig {
    BufferConfig::default().with_read_timeout(Duration::from_millis(100))
}

/// Drains one logical stream to end-of-stream.
fn drain_stream(buffer: &SegmentedBuffer) -> Vec<u8> {
    let mut bytes = Vec::new();
    while let Some(byte) = buffer.read_byte().expect("read failed") {
        bytes.push(byte);
    }
    bytes
}

// ============================================================================
// Stream Ordering
// ============================================================================

#[test]
fn test_round_trip_three_streams() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append("Hello").unwrap();
    buffer.finish(true);
    buffer.append("World").unwrap();
    buffer.finish(true);
    buffer.append("!!").unwrap();
    buffer.finish(false);

    let mut streams = Vec::new();
    while buffer.has_more_streams() {
        streams.push(drain_stream(&buffer));
    }

    assert_eq!(
        streams,
        [b"Hello".to_vec(), b"World".to_vec(), b"!!".to_vec()],
        "streams must split exactly at the finish points, in order"
    );
}

#[test]
fn test_segments_split_at_finish_points() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());

    // A stream may be built from several appends.
    buffer.append("ab").unwrap();
    buffer.append("cd").unwrap();
    buffer.finish(true);
    buffer.append("ef").unwrap();
    buffer.finish(false);

    let mut streams = Vec::new();
    while buffer.has_more_streams() {
        streams.push(drain_stream(&buffer));
    }

    assert_eq!(streams, [b"abcd".to_vec(), b"ef".to_vec()]);
}

#[test]
fn test_has_more_streams_false_only_at_terminal() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append("a").unwrap();
    buffer.finish(true);
    buffer.append("b").unwrap();
    buffer.finish(false);

    assert!(buffer.has_more_streams());
    drain_stream(&buffer);
    assert!(buffer.has_more_streams(), "second stream still queued");
    drain_stream(&buffer);
    assert!(!buffer.has_more_streams(), "terminal after the last drain");
}

#[test]
fn test_initial_block_is_open_stream() {
    let buffer = SegmentedBuffer::with_initial("seed", BufferConfig::default());
    assert_eq!(buffer.available(), 4);

    buffer.append("ling").unwrap();
    buffer.finish(false);

    let mut streams = Vec::new();
    while buffer.has_more_streams() {
        streams.push(drain_stream(&buffer));
    }
    assert_eq!(streams, [b"seedling".to_vec()]);
}

// ============================================================================
// Terminal Exhaustion
// ============================================================================

#[test]
fn test_terminal_exhaustion_is_sticky() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append("data").unwrap();
    buffer.finish(false);

    drain_stream(&buffer);
    assert!(!buffer.has_more_streams());
    assert!(buffer.is_finished());

    // Stays terminal: every further read reports end-of-stream, every
    // append is rejected.
    assert_eq!(buffer.read_byte().unwrap(), None);
    assert!(!buffer.has_more_streams());
    assert!(matches!(
        buffer.append("more").unwrap_err(),
        StreamError::AlreadyFinished
    ));
}

// ============================================================================
// Capacity Accounting
// ============================================================================

#[test]
fn test_capacity_accepts_exact_boundary() {
    let config = BufferConfig::new(16, Duration::from_millis(100)).unwrap();
    let buffer = SegmentedBuffer::new(config);

    buffer.append(vec![0xAA; 16]).unwrap();
    assert!(matches!(
        buffer.append(vec![0xAA; 1]).unwrap_err(),
        StreamError::BufferFull { .. }
    ));
}

#[test]
fn test_capacity_one_past_boundary_fails() {
    let config = BufferConfig::new(16, Duration::from_millis(100)).unwrap();
    let buffer = SegmentedBuffer::new(config);

    let err = buffer.append(vec![0xBB; 17]).unwrap_err();
    match err {
        StreamError::BufferFull { pending, capacity } => {
            assert_eq!(pending, 17);
            assert_eq!(capacity, 16);
        }
        other => panic!("expected BufferFull, got {other}"),
    }
}

#[test]
fn test_consumed_bytes_do_not_count_against_capacity() {
    let config = BufferConfig::new(16, Duration::from_millis(100)).unwrap();
    let buffer = SegmentedBuffer::new(config);

    buffer.append(vec![1u8; 10]).unwrap();
    let mut dest = [0u8; 6];
    assert_eq!(buffer.read_into(&mut dest, 0, 6).unwrap(), Some(6));

    // 4 unconsumed + 12 incoming == 16, exactly at the limit.
    buffer.append(vec![2u8; 12]).unwrap();
    assert_eq!(buffer.available(), 16);
}

// ============================================================================
// Compaction
// ============================================================================

#[test]
fn test_compaction_drops_drained_stream() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append(vec![1u8; 100]).unwrap();
    buffer.finish(true);
    buffer.append(vec![2u8; 40]).unwrap();
    buffer.finish(false);

    assert_eq!(buffer.buffered_len(), 140);
    let first = drain_stream(&buffer);
    assert_eq!(first.len(), 100);

    assert_eq!(
        buffer.buffered_len(),
        40,
        "store must not retain bytes of a fully-drained stream"
    );
}

#[test]
fn test_append_drops_consumed_prefix() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append(vec![1u8; 50]).unwrap();

    let mut dest = [0u8; 30];
    assert_eq!(buffer.read_into(&mut dest, 0, 30).unwrap(), Some(30));
    assert_eq!(buffer.buffered_len(), 50, "reading alone never shrinks");

    buffer.append(vec![2u8; 10]).unwrap();
    assert_eq!(buffer.buffered_len(), 30, "append drops the read prefix");
}

// ============================================================================
// Blocking Semantics
// ============================================================================

#[test]
fn test_non_blocking_returns_immediately() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.configure_blocking(false);

    let start = Instant::now();
    assert_eq!(buffer.read_byte().unwrap(), None);
    assert!(
        start.elapsed() < Duration::from_secs(1),
        "non-blocking read must not wait"
    );
    assert!(buffer.has_more_streams(), "not finished, not terminal");
}

#[test]
fn test_blocking_read_times_out() {
    let buffer = SegmentedBuffer::new(quick_timeout());

    let start = Instant::now();
    let err = buffer.read_byte().unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, StreamError::ReadTimeout { .. }));
    assert!(
        elapsed >= Duration::from_millis(100),
        "must wait out the full timeout, waited {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_secs(5),
        "must not wait indefinitely, waited {elapsed:?}"
    );
}

#[test]
fn test_blocked_read_woken_by_append() {
    let buffer = Arc::new(SegmentedBuffer::new(BufferConfig::default()));

    let producer = {
        let buffer = Arc::clone(&buffer);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            buffer.append("late").unwrap();
        })
    };

    assert_eq!(buffer.read_byte().unwrap(), Some(b'l'));
    producer.join().unwrap();
}

#[test]
fn test_blocked_read_woken_by_finish() {
    let buffer = Arc::new(SegmentedBuffer::new(BufferConfig::default()));

    let producer = {
        let buffer = Arc::clone(&buffer);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            buffer.finish(false);
        })
    };

    // finish with no data terminates the wait as end-of-stream.
    assert_eq!(buffer.read_byte().unwrap(), None);
    producer.join().unwrap();
    assert!(!buffer.has_more_streams());
}

#[test]
fn test_producer_consumer_round_trip() {
    let buffer = Arc::new(SegmentedBuffer::new(BufferConfig::default()));
    let messages: Vec<Vec<u8>> = (0u8..5)
        .map(|i| (0..200).map(|j| i.wrapping_add(j)).collect())
        .collect();

    let producer = {
        let buffer = Arc::clone(&buffer);
        let messages = messages.clone();
        thread::spawn(move || {
            for (i, message) in messages.iter().enumerate() {
                // Feed each message in uneven fragments, like a socket would.
                for fragment in message.chunks(37) {
                    buffer.append(fragment.to_vec()).unwrap();
                    thread::sleep(Duration::from_millis(1));
                }
                // mark-only for all but the last message
                buffer.finish(i + 1 < messages.len());
            }
        })
    };

    let mut received = Vec::new();
    while buffer.has_more_streams() {
        received.push(drain_stream(&buffer));
    }
    producer.join().unwrap();

    assert_eq!(
        received, messages,
        "consumer must reconstruct every message, split at finish points"
    );
}

// ============================================================================
// Skipping
// ============================================================================

#[test]
fn test_skip_clamps_to_current_stream() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append("abcdef").unwrap();
    buffer.finish(true);
    buffer.append("xyz").unwrap();
    buffer.finish(false);

    assert_eq!(buffer.skip(2), 2);
    assert_eq!(buffer.skip(100), 4, "clamped to the stream remainder");
    assert_eq!(buffer.skip(1), 0, "nothing left before the finish point");

    // The transition is discovered by the next read, then the next
    // stream's data is intact.
    assert_eq!(buffer.read_byte().unwrap(), None);
    assert_eq!(drain_stream(&buffer), b"xyz");
}

#[test]
fn test_skip_current_stream_abandons_remainder() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append("discard-me").unwrap();
    buffer.finish(true);
    buffer.append("keep").unwrap();
    buffer.finish(false);

    assert_eq!(buffer.read_byte().unwrap(), Some(b'd'));
    buffer.skip_current_stream();

    assert_eq!(drain_stream(&buffer), b"keep");
    assert!(!buffer.has_more_streams());
}

// ============================================================================
// Bulk Reads
// ============================================================================

#[test]
fn test_read_into_drains_in_chunks() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append(vec![7u8; 120]).unwrap();
    buffer.finish(false);

    let mut dest = [0u8; 50];
    let mut total = 0;
    while let Some(count) = buffer.read_into(&mut dest, 0, 50).unwrap() {
        assert!(count > 0, "zero only comes from a zero-length request");
        assert!(dest[..count].iter().all(|&b| b == 7));
        total += count;
    }
    assert_eq!(total, 120);
}

#[test]
fn test_read_into_stops_at_finish_point() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append("abc").unwrap();
    buffer.finish(true);
    buffer.append("defgh").unwrap();
    buffer.finish(false);

    let mut dest = [0u8; 8];
    assert_eq!(
        buffer.read_into(&mut dest, 0, 8).unwrap(),
        Some(3),
        "a bulk read never crosses into the next stream"
    );
    assert_eq!(&dest[..3], b"abc");

    assert_eq!(buffer.read_into(&mut dest, 0, 8).unwrap(), None);
    assert_eq!(buffer.read_into(&mut dest, 0, 8).unwrap(), Some(5));
    assert_eq!(&dest[..5], b"defgh");
}

#[test]
fn test_read_into_respects_offset() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append("xy").unwrap();
    buffer.finish(false);

    let mut dest = [0u8; 6];
    assert_eq!(buffer.read_into(&mut dest, 3, 3).unwrap(), Some(2));
    assert_eq!(&dest, &[0, 0, 0, b'x', b'y', 0]);
}

// ============================================================================
// Cursor Assertions and Reset
// ============================================================================

#[test]
fn test_assert_new_stream() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append("ab").unwrap();
    buffer.finish(true);
    buffer.append("cd").unwrap();
    buffer.finish(false);

    buffer.assert_new_stream().unwrap();
    buffer.read_byte().unwrap();
    assert!(matches!(
        buffer.assert_new_stream().unwrap_err(),
        StreamError::NotAtStreamStart { pos: 1 }
    ));

    // After the transition the cursor is back at a fresh stream.
    drain_stream(&buffer);
    buffer.assert_new_stream().unwrap();
}

#[test]
fn test_reset_allows_reuse() {
    let buffer = SegmentedBuffer::new(BufferConfig::default());
    buffer.append("old").unwrap();
    buffer.finish(false);
    drain_stream(&buffer);
    assert!(!buffer.has_more_streams());

    buffer.reset();
    assert!(!buffer.is_finished());
    assert_eq!(buffer.buffered_len(), 0);

    buffer.append("new").unwrap();
    buffer.finish(false);
    assert_eq!(drain_stream(&buffer), b"new");
}
