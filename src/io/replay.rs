// src/io/replay.rs
//
// Capture replay source. Streams a recorded probe byte dump through the same
// framing/decoding path as the live serial reader, in fixed-size chunks.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{atomic::AtomicBool, Arc};
use tokio::sync::mpsc;

use super::error::IoError;
use super::pump_stream;
use super::types::{ProbeMessage, SessionStats};

/// Open a capture file for replay
pub fn open_capture(path: &Path) -> Result<File, IoError> {
    File::open(path).map_err(|e| IoError::connection(path.display().to_string(), e.to_string()))
}

/// Replay `reader` in chunks of at most `chunk_size` bytes.
/// Ends with reason "complete" at EOF.
pub async fn run_replay<R>(
    name: String,
    reader: R,
    chunk_size: usize,
    stop_flag: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<ProbeMessage>,
) where
    R: Read + Send + 'static,
{
    if chunk_size == 0 {
        let err = IoError::protocol(&name, "chunk size must be at least 1 byte");
        tlog!("[Replay] {}", err);
        let _ = tx.send(ProbeMessage::Error {
            message: err.to_string(),
        });
        let _ = tx.send(ProbeMessage::Ended {
            reason: "error".to_string(),
            stats: SessionStats::default(),
        });
        return;
    }

    tlog!("[Replay] Streaming {} in {}-byte chunks", name, chunk_size);
    let _ = tx.send(ProbeMessage::Connected {
        source: name.clone(),
    });

    let tx_for_panic = tx.clone();
    let device = format!("Replay:{}", name);
    let result = tokio::task::spawn_blocking(move || {
        let mut reader = reader;
        pump_stream(&device, &mut reader, chunk_size, &stop_flag, &tx, "complete")
    })
    .await;

    if let Err(e) = result {
        tlog!("[Replay] Task panicked: {:?}", e);
        let _ = tx_for_panic.send(ProbeMessage::Ended {
            reason: "error".to_string(),
            stats: SessionStats::default(),
        });
    }
}
