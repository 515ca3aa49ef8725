// src/io/mod.rs
//
// Byte-stream sources and the framing/decoding pipeline they feed.
// Sources (serial port, capture replay) push raw chunks into a probe session;
// decoded frames leave through a presentation sink as ProbeMessages.

// Core modules
pub mod codec; // Frame codec trait and implementations
pub mod error;
pub mod session;
pub mod types;

// Sources
pub mod replay;
pub mod serial;

pub use codec::{FrameCodec, ProbeCodec};
pub use error::IoError;
pub use session::{ProbeSession, SharedProbeSession};
pub use types::{PresentationSink, ProbeMessage, SessionStats};

use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

/// Read buffer size for live sources
pub const READ_BUFFER_SIZE: usize = 256;

/// Blocking read loop shared by all sources.
///
/// Feeds every chunk read from `source` into a fresh probe session whose sink
/// is `tx`. Returns when the source reports EOF (`eof_reason`), a read fails,
/// or `stop_flag` is set. Always sends `Ended` last.
pub(crate) fn pump_stream<R: Read>(
    device: &str,
    source: &mut R,
    chunk_size: usize,
    stop_flag: &AtomicBool,
    tx: &mpsc::UnboundedSender<ProbeMessage>,
    eof_reason: &str,
) -> SessionStats {
    let mut session = ProbeSession::new(tx.clone());
    let mut buf = vec![0u8; chunk_size.max(1)];

    let reason = loop {
        if stop_flag.load(Ordering::Relaxed) {
            break "stopped";
        }

        match source.read(&mut buf) {
            Ok(0) => break eof_reason,
            Ok(n) => {
                session.on_bytes(&buf[..n]);
            }
            // Timeouts are expected on serial reads
            Err(ref e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                let err = IoError::read(device, e.to_string());
                tlog!("[{}] {}", device, err);
                let _ = tx.send(ProbeMessage::Error {
                    message: err.to_string(),
                });
                break "error";
            }
        }
    };

    if let Some(residual) = session.finish() {
        tlog!(
            "[{}] Discarding {} unterminated bytes at end of stream",
            device,
            residual.bytes.len()
        );
    }

    let stats = session.stats();
    tlog!(
        "[{}] Stream ended ({}): {} bytes, {} frames ({} samples, {} diagnostics), {} parse failures",
        device,
        reason,
        stats.bytes,
        stats.frames,
        stats.samples,
        stats.diagnostics,
        stats.parse_failures
    );

    let _ = tx.send(ProbeMessage::Ended {
        reason: reason.to_string(),
        stats,
    });
    stats
}
