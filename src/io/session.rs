// src/io/session.rs
//
// Probe session: one framer plus one presentation sink, created per device
// connection. Sources push raw chunks in; decoded frames come out the sink.

use std::sync::{Arc, Mutex, MutexGuard};

use super::codec::{FrameCodec, ProbeCodec};
use super::error::IoError;
use super::serial::codec::DecodedFrame;
use super::serial::framer::{FrameAssembler, SerialFrame};
use super::types::{PresentationSink, SessionStats};

// ============================================================================
// Probe Session
// ============================================================================

/// Routes raw chunks through framing and decoding to a sink.
///
/// Not internally synchronized. Feed it from one thread, or wrap it in
/// [`SharedProbeSession`] when chunks can arrive from several.
pub struct ProbeSession<S: PresentationSink> {
    framer: FrameAssembler,
    sink: S,
    stats: SessionStats,
}

impl<S: PresentationSink> ProbeSession<S> {
    pub fn new(sink: S) -> Self {
        Self {
            framer: FrameAssembler::new(),
            sink,
            stats: SessionStats::default(),
        }
    }

    /// Handle one chunk from the byte-stream source.
    /// Returns the number of frames completed and delivered.
    pub fn on_bytes(&mut self, chunk: &[u8]) -> usize {
        self.stats.bytes += chunk.len() as u64;

        let frames = self.framer.feed(chunk);
        let count = frames.len();
        for frame in frames {
            self.dispatch(&frame.bytes);
        }
        count
    }

    fn dispatch(&mut self, frame: &[u8]) {
        self.stats.frames += 1;
        match ProbeCodec::decode(frame) {
            DecodedFrame::Sample(sample) => {
                self.stats.samples += 1;
                self.stats.parse_failures += sample.parse_failures.len() as u64;
                self.sink.show_vector(&sample.values);
            }
            DecodedFrame::Diagnostic(text) => {
                self.stats.diagnostics += 1;
                self.sink.show_diagnostic(&text);
            }
        }
    }

    /// End of stream: take whatever never got a delimiter.
    /// The residual is returned for logging, not decoded.
    pub fn finish(&mut self) -> Option<SerialFrame> {
        self.framer.flush()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn pending_len(&self) -> usize {
        self.framer.pending_len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

// ============================================================================
// Shared Probe Session
// ============================================================================

/// Lock-serialized session for sources that deliver from more than one thread.
/// The lock is held across framing, decoding and delivery, so frames reach the
/// sink in the order their chunks were accepted.
pub struct SharedProbeSession<S: PresentationSink> {
    inner: Arc<Mutex<ProbeSession<S>>>,
}

impl<S: PresentationSink> Clone for SharedProbeSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: PresentationSink> SharedProbeSession<S> {
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ProbeSession::new(sink))),
        }
    }

    pub fn on_bytes(&self, chunk: &[u8]) -> Result<usize, IoError> {
        Ok(self.lock()?.on_bytes(chunk))
    }

    pub fn stats(&self) -> Result<SessionStats, IoError> {
        Ok(self.lock()?.stats())
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, ProbeSession<S>>, IoError> {
        self.inner
            .lock()
            .map_err(|e| IoError::session(format!("probe session lock poisoned: {}", e)))
    }
}
