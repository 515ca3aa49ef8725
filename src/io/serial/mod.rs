// src/io/serial/mod.rs
//
// ReflectProbe serial driver.
//
// - framer: newline framing with partial-frame carry-over
// - codec: sample/diagnostic line decoding
// - reader: serial port source feeding a probe session

pub mod codec;
pub mod framer;
pub mod reader;
pub(crate) mod utils;

pub use codec::{DecodedFrame, SampleVector, MAGIC_SAMPLE_PREFIX};
pub use framer::{FrameAssembler, SerialFrame};
pub use reader::{list_serial_ports, run_source, SerialConfig, SerialPortInfo};
pub use utils::Parity;
