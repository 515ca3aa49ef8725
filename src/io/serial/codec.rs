// src/io/serial/codec.rs
//
// ReflectProbe line protocol codec.
//
// Frame formats (one per line, LF terminated):
//   Sample:     12345-<v1>-<v2>-...-<vN>-\n
//   Diagnostic: <any text not starting with 12345>\n
//
// Sample values are base-10 integers, one per sensor channel. The trailing
// separator leaves an empty final field, so a frame with N values has N + 2
// fields after splitting on '-'.

use serde::Serialize;

use crate::io::codec::FrameCodec;

// ============================================================================
// Constants
// ============================================================================

/// Prefix marking a sample frame
pub const MAGIC_SAMPLE_PREFIX: &str = "12345";

/// Separator between sample fields
pub const FIELD_SEPARATOR: char = '-';

// ============================================================================
// Types
// ============================================================================

/// Sensor values decoded from one sample frame
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SampleVector {
    /// One value per channel; field 1 is index 0
    pub values: Vec<i32>,
    /// Field indices (1-based, as split) that failed to parse and were zeroed
    pub parse_failures: Vec<usize>,
}

/// Result of decoding one frame
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedFrame {
    /// Free-form device text, delimiter removed
    Diagnostic(String),
    /// Numeric sample
    Sample(SampleVector),
}

/// ReflectProbe line protocol codec.
pub struct ProbeCodec;

impl FrameCodec for ProbeCodec {
    type Decoded = DecodedFrame;
    type Value = i32;

    /// Decode one probe frame.
    ///
    /// Examples:
    ///   `12345-10-20-255-0-\n` -> Sample [10, 20, 255, 0]
    ///   `12345-10-xx-255-\n`   -> Sample [10, 0, 255], field 2 logged as a failure
    ///   `12345\n`              -> Sample []
    ///   `booting up\n`         -> Diagnostic "booting up"
    fn decode(frame: &[u8]) -> DecodedFrame {
        let text = String::from_utf8_lossy(strip_delimiter(frame));

        // Classify before splitting: diagnostics may contain '-'
        if text.starts_with(MAGIC_SAMPLE_PREFIX) {
            DecodedFrame::Sample(decode_sample(&text))
        } else {
            DecodedFrame::Diagnostic(text.into_owned())
        }
    }

    /// Encode sensor values as a sample frame.
    ///
    /// Negative values cannot be represented: their sign collides with the
    /// field separator.
    fn encode(values: &[i32]) -> Vec<u8> {
        let mut line = String::with_capacity(MAGIC_SAMPLE_PREFIX.len() + values.len() * 4 + 2);
        line.push_str(MAGIC_SAMPLE_PREFIX);
        for value in values {
            line.push(FIELD_SEPARATOR);
            line.push_str(&value.to_string());
        }
        line.push(FIELD_SEPARATOR);
        line.push('\n');
        line.into_bytes()
    }
}

/// Remove one trailing LF, then one trailing CR if the device sent CRLF.
fn strip_delimiter(frame: &[u8]) -> &[u8] {
    let frame = frame.strip_suffix(b"\n").unwrap_or(frame);
    frame.strip_suffix(b"\r").unwrap_or(frame)
}

/// Best-effort sample parse. A bad field zeroes its slot but never
/// discards the rest of the frame.
fn decode_sample(text: &str) -> SampleVector {
    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).collect();

    // First field is the prefix, last is the empty tail after the final separator
    let len = fields.len().saturating_sub(2);
    let mut values = vec![0i32; len];
    let mut parse_failures = Vec::new();

    for (i, field) in fields.iter().enumerate().skip(1).take(len) {
        match field.trim().parse::<i32>() {
            Ok(value) => values[i - 1] = value,
            Err(e) => {
                tlog!("[Decoder] Failed to parse value at index {}: {:?} ({})", i, field, e);
                parse_failures.push(i);
            }
        }
    }

    if fields.len() >= 2 {
        if let Some(tail) = fields.last() {
            if !tail.trim().is_empty() {
                tlog!("[Decoder] Sample frame missing trailing separator, dropped tail {:?}", tail);
            }
        }
    }

    SampleVector {
        values,
        parse_failures,
    }
}
