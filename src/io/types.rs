// src/io/types.rs
//
// Types shared between the byte-stream sources, the probe session and the
// presentation task.

use serde::Serialize;
use tokio::sync::mpsc;

// ============================================================================
// Presentation Sink
// ============================================================================

/// Receiver of decoded probe output.
///
/// Called synchronously from whichever thread feeds the session. Implementors
/// that need a specific thread (a UI loop) must hand the data off themselves;
/// calls should not block.
pub trait PresentationSink: Send {
    /// Display free-form device text
    fn show_diagnostic(&mut self, text: &str);

    /// Display one decoded sample vector
    fn show_vector(&mut self, values: &[i32]);
}

// ============================================================================
// Session Statistics
// ============================================================================

/// Running counters for one probe session
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SessionStats {
    /// Raw bytes fed in
    pub bytes: u64,
    /// Complete frames extracted
    pub frames: u64,
    /// Frames decoded as samples
    pub samples: u64,
    /// Frames passed through as diagnostics
    pub diagnostics: u64,
    /// Sample fields that failed to parse and were zeroed
    pub parse_failures: u64,
}

// ============================================================================
// Source Messages
// ============================================================================

/// Message handed from a source to the presentation task
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProbeMessage {
    /// Source opened (port name or replay file)
    Connected { source: String },
    /// Diagnostic text from the device
    Diagnostic { text: String },
    /// Decoded sample vector
    Values { values: Vec<i32> },
    /// Source finished (reason: "stopped", "disconnected", "complete", "error")
    Ended { reason: String, stats: SessionStats },
    /// Source error; followed by Ended
    Error { message: String },
}

/// Channel handoff: every sink call becomes a message for the presentation task.
/// A dropped receiver means nobody is watching, so sends are best-effort.
impl PresentationSink for mpsc::UnboundedSender<ProbeMessage> {
    fn show_diagnostic(&mut self, text: &str) {
        let _ = self.send(ProbeMessage::Diagnostic {
            text: text.to_string(),
        });
    }

    fn show_vector(&mut self, values: &[i32]) {
        let _ = self.send(ProbeMessage::Values {
            values: values.to_vec(),
        });
    }
}
