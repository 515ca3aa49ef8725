// tools/probe_cli/main.rs
//
// Command-line front end for the ReflectProbe reader.
// Reads a live serial port or replays a capture file, printing decoded
// samples and device diagnostics to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use reflect_probe_lib::io::serial::list_serial_ports;
use reflect_probe_lib::settings::load_settings;
use reflect_probe_lib::{run_blocking, tlog, ProbeSource};

#[derive(Parser, Debug)]
#[command(name = "probe_cli", about = "Stream and decode ReflectProbe serial output")]
struct Args {
    /// Settings file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial port, overrides settings
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate, overrides settings
    #[arg(short, long)]
    baud: Option<u32>,

    /// Print one JSON object per message
    #[arg(long)]
    json: bool,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Replay a recorded capture instead of opening a port
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Replay chunk size in bytes
    #[arg(long, default_value_t = 64)]
    chunk: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.list_ports {
        return match list_serial_ports() {
            Ok(ports) => {
                for p in ports {
                    let usb = match (p.vid, p.pid) {
                        (Some(vid), Some(pid)) => format!(" [{:04x}:{:04x}]", vid, pid),
                        _ => String::new(),
                    };
                    println!(
                        "{}\t{}{}\t{}",
                        p.port_name,
                        p.port_type,
                        usb,
                        p.product.unwrap_or_default()
                    );
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                tlog!("[probe_cli] {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let mut settings = match load_settings(args.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            tlog!("[probe_cli] {}", e);
            return ExitCode::from(2);
        }
    };
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(baud) = args.baud {
        settings.baud_rate = baud;
    }
    if args.json {
        settings.json_output = true;
    }

    let source = match args.replay {
        Some(path) => ProbeSource::Replay {
            path,
            chunk_size: args.chunk,
        },
        None => ProbeSource::Serial(settings.serial_config()),
    };

    match run_blocking(&settings, source) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tlog!("[probe_cli] {}", e);
            ExitCode::FAILURE
        }
    }
}
