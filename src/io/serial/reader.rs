// src/io/serial/reader.rs
//
// Serial port source for the probe.
// Opens the port, then runs a blocking read loop that feeds every chunk
// through a probe session whose sink is the presentation channel.

use serde::Serialize;
use std::sync::{atomic::AtomicBool, Arc};
use std::time::Duration;
use tokio::sync::mpsc;

use super::utils::{self, Parity};
use crate::io::error::IoError;
use crate::io::types::{ProbeMessage, SessionStats};
use crate::io::{pump_stream, READ_BUFFER_SIZE};

// ============================================================================
// Types and Configuration
// ============================================================================

/// Serial port configuration
#[derive(Clone, Debug, PartialEq)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
    /// Read timeout; bounds how long a stop request can go unnoticed
    pub read_timeout: Duration,
}

/// Information about an available serial port
#[derive(Clone, Debug, Serialize)]
pub struct SerialPortInfo {
    pub port_name: String,
    pub port_type: String,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
}

impl SerialConfig {
    /// Short `921600 8N1` style summary for logs
    pub fn line_settings(&self) -> String {
        format!(
            "{} {}{}{}",
            self.baud_rate,
            self.data_bits,
            self.parity.letter(),
            self.stop_bits
        )
    }
}

// ============================================================================
// Serial Source
// ============================================================================

fn open_port(config: &SerialConfig) -> Result<Box<dyn serialport::SerialPort>, IoError> {
    serialport::new(&config.port, config.baud_rate)
        .data_bits(utils::to_serialport_data_bits(config.data_bits))
        .stop_bits(utils::to_serialport_stop_bits(config.stop_bits))
        .parity(utils::to_serialport_parity(&config.parity))
        .timeout(config.read_timeout)
        .open()
        .map_err(|e| IoError::connection(&config.port, e.to_string()))
}

/// Run the serial source until the port closes or `stop_flag` is set.
///
/// Sends `Connected` once the port is open, decoded output while streaming,
/// and always finishes with `Ended`.
pub async fn run_source(
    config: SerialConfig,
    stop_flag: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<ProbeMessage>,
) {
    let mut port = match open_port(&config) {
        Ok(p) => p,
        Err(e) => {
            tlog!("[Serial:{}] {}", config.port, e);
            let _ = tx.send(ProbeMessage::Error {
                message: e.to_string(),
            });
            let _ = tx.send(ProbeMessage::Ended {
                reason: "error".to_string(),
                stats: SessionStats::default(),
            });
            return;
        }
    };

    tlog!(
        "[Serial:{}] Opened {} ({})",
        config.port,
        config.port,
        config.line_settings()
    );
    let _ = tx.send(ProbeMessage::Connected {
        source: config.port.clone(),
    });

    let device = format!("Serial:{}", config.port);
    let tx_for_panic = tx.clone();

    // Blocking serial I/O runs on a dedicated thread
    let result = tokio::task::spawn_blocking(move || {
        pump_stream(&device, &mut port, READ_BUFFER_SIZE, &stop_flag, &tx, "disconnected")
    })
    .await;

    if let Err(e) = result {
        tlog!("[Serial:{}] Task panicked: {:?}", config.port, e);
        let _ = tx_for_panic.send(ProbeMessage::Ended {
            reason: "error".to_string(),
            stats: SessionStats::default(),
        });
    }
}

/// List serial ports available on this machine
pub fn list_serial_ports() -> Result<Vec<SerialPortInfo>, String> {
    let ports =
        serialport::available_ports().map_err(|e| format!("Failed to enumerate ports: {}", e))?;

    Ok(ports
        .into_iter()
        // On macOS, only show /dev/cu.* (calling unit), not /dev/tty.*
        .filter(|_p| {
            #[cfg(target_os = "macos")]
            {
                !_p.port_name.starts_with("/dev/tty.")
            }
            #[cfg(not(target_os = "macos"))]
            {
                true
            }
        })
        .map(|p| {
            let (port_type, manufacturer, product, serial_number, vid, pid) = match p.port_type {
                serialport::SerialPortType::UsbPort(info) => (
                    "USB".to_string(),
                    info.manufacturer,
                    info.product,
                    info.serial_number,
                    Some(info.vid),
                    Some(info.pid),
                ),
                serialport::SerialPortType::BluetoothPort => {
                    ("Bluetooth".to_string(), None, None, None, None, None)
                }
                serialport::SerialPortType::PciPort => {
                    ("PCI".to_string(), None, None, None, None, None)
                }
                serialport::SerialPortType::Unknown => {
                    ("Unknown".to_string(), None, None, None, None, None)
                }
            };
            SerialPortInfo {
                port_name: p.port_name,
                port_type,
                manufacturer,
                product,
                serial_number,
                vid,
                pid,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(port: &str) -> SerialConfig {
        SerialConfig {
            port: port.to_string(),
            baud_rate: 921_600,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            read_timeout: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_line_settings() {
        assert_eq!(config("COM5").line_settings(), "921600 8N1");

        let mut cfg = config("COM5");
        cfg.parity = Parity::Even;
        cfg.stop_bits = 2;
        assert_eq!(cfg.line_settings(), "921600 8E2");
    }

    #[tokio::test]
    async fn test_missing_port_reports_error_then_ended() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));

        run_source(config("/dev/reflect-probe-does-not-exist"), stop, tx).await;

        assert!(matches!(rx.recv().await, Some(ProbeMessage::Error { .. })));
        match rx.recv().await {
            Some(ProbeMessage::Ended { reason, stats }) => {
                assert_eq!(reason, "error");
                assert_eq!(stats, SessionStats::default());
            }
            other => panic!("Expected Ended, got {:?}", other),
        }
    }
}
