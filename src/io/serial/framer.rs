// src/io/serial/framer.rs
//
// Newline framing for the probe's serial stream.
// Buffers raw bytes across reads and splits them into complete `\n`-terminated
// frames, carrying any trailing partial frame over to the next read.

// =============================================================================
// Constants
// =============================================================================

/// Frame delimiter (LF). Every probe message ends with exactly one.
pub const FRAME_DELIMITER: u8 = b'\n';

// =============================================================================
// Types
// =============================================================================

/// A complete frame extracted from the serial stream
#[derive(Debug, Clone, PartialEq)]
pub struct SerialFrame {
    /// Frame data bytes, including the trailing delimiter for complete frames
    pub bytes: Vec<u8>,
    /// Whether this frame came from flush() and has no delimiter
    pub incomplete: bool,
}

impl SerialFrame {
    fn complete(bytes: Vec<u8>) -> Self {
        SerialFrame {
            bytes,
            incomplete: false,
        }
    }
}

// =============================================================================
// Frame Assembler
// =============================================================================

/// Stateful line framer for streaming data.
///
/// Bytes are appended to a pending buffer on every `feed`; each `\n` found
/// closes one frame. The pending buffer never holds a delimiter between calls,
/// and it is not bounded: a device that never sends `\n` grows it indefinitely.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to contain no delimiter
    scanned: usize,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes into the framer.
    /// Returns every frame completed by this chunk, in arrival order.
    pub fn feed(&mut self, data: &[u8]) -> Vec<SerialFrame> {
        let mut frames = Vec::new();
        self.buffer.extend_from_slice(data);

        let mut start = 0;
        let mut cursor = self.scanned;
        while let Some(offset) = self.buffer[cursor..]
            .iter()
            .position(|&b| b == FRAME_DELIMITER)
        {
            let end = cursor + offset + 1;
            frames.push(SerialFrame::complete(self.buffer[start..end].to_vec()));
            start = end;
            cursor = end;
        }

        // One drain per call, not per frame
        self.buffer.drain(..start);
        self.scanned = self.buffer.len();

        frames
    }

    /// Flush any remaining buffered data as a frame.
    /// Call when the stream ends; the frame is marked incomplete.
    pub fn flush(&mut self) -> Option<SerialFrame> {
        self.scanned = 0;
        if self.buffer.is_empty() {
            None
        } else {
            Some(SerialFrame {
                bytes: std::mem::take(&mut self.buffer),
                incomplete: true,
            })
        }
    }

    /// Number of bytes waiting for a delimiter
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &[u8] = b"booting up\n12345-10-20-255-0-\nsensor warm\n12345-1-2-\n\n12345-7-\n";

    fn collect(frames: Vec<SerialFrame>) -> Vec<Vec<u8>> {
        frames.into_iter().map(|f| f.bytes).collect()
    }

    fn expected_frames() -> Vec<Vec<u8>> {
        vec![
            b"booting up\n".to_vec(),
            b"12345-10-20-255-0-\n".to_vec(),
            b"sensor warm\n".to_vec(),
            b"12345-1-2-\n".to_vec(),
            b"\n".to_vec(),
            b"12345-7-\n".to_vec(),
        ]
    }

    /// Small LCG so chunk boundaries vary without pulling in a rand crate
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: usize) -> usize {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 33) as usize) % bound
        }
    }

    #[test]
    fn test_single_frame() {
        let mut framer = FrameAssembler::new();
        let frames = framer.feed(b"hello\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].bytes, b"hello\n".to_vec());
        assert!(!frames[0].incomplete);
        assert!(framer.is_empty());
    }

    #[test]
    fn test_back_to_back_frames_in_one_chunk() {
        let mut framer = FrameAssembler::new();
        let frames = framer.feed(STREAM);

        assert_eq!(collect(frames), expected_frames());
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_partial_frame_is_held() {
        let mut framer = FrameAssembler::new();

        assert!(framer.feed(b"12345-1-").is_empty());
        assert_eq!(framer.pending_len(), 8);

        assert!(framer.feed(b"2-").is_empty());
        let frames = framer.feed(b"\n");
        assert_eq!(collect(frames), vec![b"12345-1-2-\n".to_vec()]);
        assert!(framer.is_empty());
    }

    #[test]
    fn test_split_chunk_boundary_mid_frame() {
        let mut framer = FrameAssembler::new();

        let first = framer.feed(b"12345-1-2-");
        assert!(first.is_empty());

        let second = framer.feed(b"\n12345-3-4-\n");
        assert_eq!(
            collect(second),
            vec![b"12345-1-2-\n".to_vec(), b"12345-3-4-\n".to_vec()]
        );
    }

    #[test]
    fn test_residual_after_last_delimiter() {
        let mut framer = FrameAssembler::new();
        let frames = framer.feed(b"one\ntwo\nthr");

        assert_eq!(collect(frames), vec![b"one\n".to_vec(), b"two\n".to_vec()]);
        assert_eq!(framer.pending_len(), 3);

        let frames = framer.feed(b"ee\n");
        assert_eq!(collect(frames), vec![b"three\n".to_vec()]);
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut framer = FrameAssembler::new();
        assert!(framer.feed(b"").is_empty());
        assert!(framer.feed(b"abc").is_empty());
        assert!(framer.feed(b"").is_empty());
        assert_eq!(framer.pending_len(), 3);
    }

    #[test]
    fn test_every_split_offset_yields_same_frames() {
        for split in 0..=STREAM.len() {
            let mut framer = FrameAssembler::new();
            let mut frames = collect(framer.feed(&STREAM[..split]));
            frames.extend(collect(framer.feed(&STREAM[split..])));

            assert_eq!(frames, expected_frames(), "split at {}", split);
            assert!(framer.is_empty());
        }
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut framer = FrameAssembler::new();
        let mut frames = Vec::new();
        for &b in STREAM {
            frames.extend(collect(framer.feed(&[b])));
        }
        assert_eq!(frames, expected_frames());
    }

    #[test]
    fn test_random_chunking_no_loss_no_duplication() {
        // Trailing partial frame left unterminated on purpose
        let mut stream = STREAM.repeat(20);
        stream.extend_from_slice(b"12345-9-");

        for seed in 1..50u64 {
            let mut rng = Lcg(seed);
            let mut framer = FrameAssembler::new();
            let mut emitted: Vec<u8> = Vec::new();
            let mut frame_count = 0;

            let mut pos = 0;
            while pos < stream.len() {
                let len = 1 + rng.next(40);
                let end = (pos + len).min(stream.len());
                for frame in framer.feed(&stream[pos..end]) {
                    assert_eq!(frame.bytes.last(), Some(&FRAME_DELIMITER));
                    assert_eq!(
                        frame.bytes.iter().filter(|&&b| b == FRAME_DELIMITER).count(),
                        1
                    );
                    emitted.extend_from_slice(&frame.bytes);
                    frame_count += 1;
                }
                pos = end;
            }

            assert_eq!(frame_count, 6 * 20);
            let residual = framer.flush().map(|f| f.bytes).unwrap_or_default();
            assert_eq!(residual, b"12345-9-".to_vec());
            emitted.extend_from_slice(&residual);
            assert_eq!(emitted, stream, "seed {}", seed);
        }
    }

    #[test]
    fn test_flush_marks_incomplete() {
        let mut framer = FrameAssembler::new();

        // Feed data without a delimiter
        assert!(framer.feed(b"partial").is_empty());

        let flushed = framer.flush();
        assert!(flushed.is_some());
        let frame = flushed.unwrap();
        assert!(frame.incomplete);
        assert_eq!(frame.bytes, b"partial".to_vec());

        assert!(framer.flush().is_none());
        assert!(framer.is_empty());
    }

    #[test]
    fn test_long_undelimited_run_then_delimiter() {
        let mut framer = FrameAssembler::new();
        for _ in 0..1000 {
            assert!(framer.feed(b"x").is_empty());
        }
        let frames = framer.feed(b"\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].bytes.len(), 1001);
    }
}
