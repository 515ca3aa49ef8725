// src/io/codec.rs
//
// Frame codec trait and re-export of the probe's line protocol implementation.
//
// The codec works on one complete frame at a time. Stream reassembly is the
// framer's job (serial/framer.rs); by the time a frame reaches decode() its
// terminating delimiter has already been seen.

// ============================================================================
// Frame Codec Trait
// ============================================================================

/// Trait for line-protocol codecs.
///
/// Unlike a strict wire codec, decode() is total: every frame maps to some
/// decoded value, with malformed content degraded rather than rejected.
pub trait FrameCodec {
    /// Decoded representation of one frame
    type Decoded;

    /// Value type carried by an encodable frame
    type Value;

    /// Decode one complete frame (delimiter included or not).
    fn decode(frame: &[u8]) -> Self::Decoded;

    /// Encode values into a complete, delimiter-terminated frame.
    fn encode(values: &[Self::Value]) -> Vec<u8>;
}

// ============================================================================
// Re-exports from driver modules
// ============================================================================

pub use super::serial::codec::ProbeCodec;
