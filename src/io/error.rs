// src/io/error.rs
//
// Error type shared by the byte-stream sources and the probe session.
// The framer and decoder never fail; these cover the plumbing around them.

use std::fmt;

/// Errors raised by sources (serial port, replay) and the shared session.
#[derive(Clone, Debug, PartialEq)]
pub enum IoError {
    /// Device could not be opened or configured
    Connection { device: String, message: String },
    /// Device or source violated the expected protocol
    Protocol { device: String, message: String },
    /// Read from the device failed mid-stream
    Read { device: String, message: String },
    /// Probe session state could not be accessed (e.g. poisoned lock)
    Session(String),
}

impl IoError {
    pub fn connection(device: impl Into<String>, message: impl Into<String>) -> Self {
        IoError::Connection {
            device: device.into(),
            message: message.into(),
        }
    }

    pub fn protocol(device: impl Into<String>, message: impl Into<String>) -> Self {
        IoError::Protocol {
            device: device.into(),
            message: message.into(),
        }
    }

    pub fn read(device: impl Into<String>, message: impl Into<String>) -> Self {
        IoError::Read {
            device: device.into(),
            message: message.into(),
        }
    }

    pub fn session(message: impl Into<String>) -> Self {
        IoError::Session(message.into())
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Connection { device, message } => {
                write!(f, "{}: connection failed: {}", device, message)
            }
            IoError::Protocol { device, message } => {
                write!(f, "{}: protocol error: {}", device, message)
            }
            IoError::Read { device, message } => write!(f, "{}: read error: {}", device, message),
            IoError::Session(message) => write!(f, "session error: {}", message),
        }
    }
}

impl std::error::Error for IoError {}

impl From<IoError> for String {
    fn from(e: IoError) -> Self {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_device() {
        let e = IoError::connection("COM5", "access denied");
        assert_eq!(e.to_string(), "COM5: connection failed: access denied");
    }

    #[test]
    fn test_into_string() {
        let s: String = IoError::session("lock poisoned").into();
        assert_eq!(s, "session error: lock poisoned");
    }
}
