use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::io::serial::{Parity, SerialConfig};

const SETTINGS_DIR: &str = "reflect-probe";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProbeSettings {
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default)]
    pub parity: Parity,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Directory for timestamped log files (unset = stderr only)
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Print one JSON object per message instead of text lines
    #[serde(default)]
    pub json_output: bool,
}

fn default_port() -> String {
    "COM5".to_string()
}
fn default_baud_rate() -> u32 {
    921_600
}
fn default_data_bits() -> u8 {
    8
}
fn default_stop_bits() -> u8 {
    1
}
fn default_read_timeout_ms() -> u64 {
    10
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: Parity::default(),
            read_timeout_ms: default_read_timeout_ms(),
            log_dir: None,
            json_output: false,
        }
    }
}

impl ProbeSettings {
    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            data_bits: self.data_bits,
            stop_bits: self.stop_bits,
            parity: self.parity,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

/// `<config dir>/reflect-probe/settings.toml`, if the platform has a config dir
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

/// Load settings from `path`, or from the default location when `None`.
/// A missing file yields defaults; an unreadable or malformed one is an error.
pub fn load_settings(path: Option<&Path>) -> Result<ProbeSettings, String> {
    let path = match path.map(Path::to_path_buf).or_else(default_settings_path) {
        Some(p) => p,
        None => {
            tlog!("[settings] No config directory, using defaults");
            return Ok(ProbeSettings::default());
        }
    };

    if !path.exists() {
        tlog!("[settings] {} not found, using defaults", path.display());
        return Ok(ProbeSettings::default());
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_settings(&contents).map_err(|e| format!("Invalid settings in {}: {}", path.display(), e))
}

fn parse_settings(contents: &str) -> Result<ProbeSettings, String> {
    toml::from_str(contents).map_err(|e| e.to_string())
}
